//! localStorage への要約ライブラリ保存

use narrato_common::MemoryStore;
use web_sys::Storage;

const LIBRARY_KEY: &str = "narrato.library";
/// 読めなかったライブラリの退避先
const BACKUP_KEY: &str = "narrato.library.bak";

fn now_millis() -> i64 {
    js_sys::Date::now() as i64
}

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// 保存済みライブラリを読み込む
///
/// 無い場合は空。壊れている場合は元のJSONを退避してから空で始める
pub fn load_library() -> MemoryStore {
    let storage = local_storage();
    let stored = storage
        .as_ref()
        .and_then(|s| s.get_item(LIBRARY_KEY).ok().flatten());

    let Some(json) = stored else {
        return MemoryStore::new(now_millis);
    };

    match serde_json::from_str::<MemoryStore>(&json) {
        Ok(mut store) => {
            store.set_clock(now_millis);
            store
        }
        Err(e) => {
            web_sys::console::warn_1(&format!("library is unreadable: {}", e).into());
            if let Some(storage) = storage {
                if storage.set_item(BACKUP_KEY, &json).is_err() {
                    web_sys::console::warn_1(&"could not back up the unreadable library".into());
                }
            }
            MemoryStore::new(now_millis)
        }
    }
}

/// ライブラリを書き出す
pub fn save_library(store: &MemoryStore) -> Result<(), String> {
    let storage = local_storage().ok_or_else(|| "localStorage is unavailable".to_string())?;
    let json = serde_json::to_string(store).map_err(|e| e.to_string())?;
    storage
        .set_item(LIBRARY_KEY, &json)
        .map_err(|e| format!("保存失敗: {:?}", e))
}
