//! 要約・メモの保存先
//!
//! ユーザーごとのメモと要約一覧を保持するドキュメントストア。
//! 一覧の購読者には変更のたびに全件スナップショット（作成日時の降順）を送る。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::SummaryRecord;

/// ユーザー識別子（認証は外部プロバイダ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: String,
    pub is_ready: bool,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_ready: true,
        }
    }

    /// 認証待ち
    pub fn pending() -> Self {
        Self {
            user_id: String::new(),
            is_ready: false,
        }
    }
}

pub type SubscriptionId = u64;

/// 購読コールバック
pub type SnapshotCallback = Box<dyn FnMut(&[SummaryRecord])>;

/// ドキュメントストアの操作
pub trait SummaryStore {
    fn get_notes(&self, user_id: &str) -> Option<String>;

    /// メモを保存（他のフィールドはマージ）
    fn set_notes(&mut self, user_id: &str, notes: &str) -> Result<()>;

    /// 要約を追加してIDを返す
    fn add_summary(&mut self, user_id: &str, record: SummaryRecord) -> Result<String>;

    /// 部分更新（マージ）
    fn update_summary(&mut self, id: &str, partial: Value) -> Result<SummaryRecord>;

    fn delete_summary(&mut self, id: &str) -> Result<()>;

    fn get_summary(&self, id: &str) -> Option<SummaryRecord>;

    /// 作成日時の降順
    fn list_summaries(&self, user_id: &str) -> Vec<SummaryRecord>;

    /// 一覧を購読。登録直後にも現在のスナップショットを送る
    fn subscribe(&mut self, user_id: &str, callback: SnapshotCallback) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// ユーザードキュメント
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserDocument {
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

struct Subscriber {
    id: SubscriptionId,
    user_id: String,
    callback: SnapshotCallback,
}

/// メモリ上のストア
///
/// データ部分はシリアライズ可能で、CLIはこれをファイルに保存する
#[derive(Serialize, Deserialize)]
pub struct MemoryStore {
    users: BTreeMap<String, UserDocument>,
    summaries: BTreeMap<String, SummaryRecord>,
    next_id: u64,
    #[serde(skip)]
    subscribers: Vec<Subscriber>,
    #[serde(skip)]
    next_subscription: SubscriptionId,
    #[serde(skip, default = "default_clock")]
    clock: Box<dyn Fn() -> i64>,
}

/// 時計未設定時は0（読み込み後に `set_clock` で差し替える）
fn default_clock() -> Box<dyn Fn() -> i64> {
    Box::new(|| 0)
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("users", &self.users.len())
            .field("summaries", &self.summaries.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl MemoryStore {
    /// `clock` はエポックミリ秒を返す
    pub fn new(clock: impl Fn() -> i64 + 'static) -> Self {
        Self {
            users: BTreeMap::new(),
            summaries: BTreeMap::new(),
            next_id: 1,
            subscribers: Vec::new(),
            next_subscription: 1,
            clock: Box::new(clock),
        }
    }

    pub fn set_clock(&mut self, clock: impl Fn() -> i64 + 'static) {
        self.clock = Box::new(clock);
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    fn allocate_id(&mut self) -> String {
        loop {
            let id = format!("s{:06}", self.next_id);
            self.next_id += 1;
            if !self.summaries.contains_key(&id) {
                return id;
            }
        }
    }

    fn notify(&mut self, user_id: &str) {
        if !self.subscribers.iter().any(|s| s.user_id == user_id) {
            return;
        }
        let snapshot = self.list_summaries(user_id);
        for subscriber in self.subscribers.iter_mut().filter(|s| s.user_id == user_id) {
            (subscriber.callback)(&snapshot);
        }
    }
}

impl SummaryStore for MemoryStore {
    fn get_notes(&self, user_id: &str) -> Option<String> {
        self.users.get(user_id).and_then(|doc| doc.notes.clone())
    }

    fn set_notes(&mut self, user_id: &str, notes: &str) -> Result<()> {
        if user_id.is_empty() {
            return Err(Error::Config("user is not signed in".into()));
        }
        self.users.entry(user_id.to_string()).or_default().notes = Some(notes.to_string());
        Ok(())
    }

    fn add_summary(&mut self, user_id: &str, mut record: SummaryRecord) -> Result<String> {
        if user_id.is_empty() {
            return Err(Error::Config("user is not signed in".into()));
        }
        let id = self.allocate_id();
        record.id = Some(id.clone());
        record.user_id = Some(user_id.to_string());
        record.created_at = Some((self.clock)());

        tracing::info!("summary saved with id {}", id);
        self.summaries.insert(id.clone(), record);
        self.notify(user_id);
        Ok(id)
    }

    fn update_summary(&mut self, id: &str, partial: Value) -> Result<SummaryRecord> {
        let current = self
            .summaries
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("summary {}", id)))?;

        let Value::Object(patch) = partial else {
            return Err(Error::Config("summary update must be a JSON object".into()));
        };

        let mut merged = serde_json::to_value(current)?;
        if let Value::Object(fields) = &mut merged {
            for (key, value) in patch {
                // 識別子と所有者は書き換えさせない
                if matches!(key.as_str(), "id" | "userId" | "createdAt") {
                    continue;
                }
                fields.insert(key, value);
            }
        }
        let updated: SummaryRecord = serde_json::from_value(merged)?;

        let user_id = updated.user_id.clone().unwrap_or_default();
        self.summaries.insert(id.to_string(), updated.clone());
        self.notify(&user_id);
        Ok(updated)
    }

    fn delete_summary(&mut self, id: &str) -> Result<()> {
        let removed = self
            .summaries
            .remove(id)
            .ok_or_else(|| Error::NotFound(format!("summary {}", id)))?;
        if let Some(user_id) = removed.user_id {
            self.notify(&user_id);
        }
        Ok(())
    }

    fn get_summary(&self, id: &str) -> Option<SummaryRecord> {
        self.summaries.get(id).cloned()
    }

    fn list_summaries(&self, user_id: &str) -> Vec<SummaryRecord> {
        let mut records: Vec<SummaryRecord> = self
            .summaries
            .values()
            .filter(|r| r.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        records
    }

    fn subscribe(&mut self, user_id: &str, mut callback: SnapshotCallback) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;

        callback(&self.list_summaries(user_id));
        self.subscribers.push(Subscriber {
            id,
            user_id: user_id.to_string(),
            callback,
        });
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }
}

/// タイトルの部分一致（大文字小文字を無視）
pub fn filter_by_title<'a>(records: &'a [SummaryRecord], query: &str) -> Vec<&'a SummaryRecord> {
    let query = query.trim().to_lowercase();
    records
        .iter()
        .filter(|r| query.is_empty() || r.display_title().to_lowercase().contains(&query))
        .collect()
}
