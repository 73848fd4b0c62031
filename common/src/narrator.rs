//! 読み上げ（TTS）アダプター
//!
//! `/api/tts` から取得したBase64音声を再生する。失敗時は端末のローカル音声合成に
//! フォールバックし、それも無理なら何もしない（エラーバナーには出さない）。

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

use crate::api::{ApiConfig, RawResponse, Transport, TransportError, TtsRequest};
use crate::decoder::decode;
use crate::error::{Error, Result};

/// MIMEタイプが見つからないときの既定値
pub const DEFAULT_AUDIO_MIME: &str = "audio/wav";

/// 音声データの候補パス（先頭が優先）
///
/// 合成APIのスキーマが安定していないため複数の形を受け付ける
pub const AUDIO_PAYLOAD_PATHS: [&[&str]; 3] = [&["audioData"], &["audio", "data"], &["data", "audio"]];

/// MIMEタイプの候補パス（先頭が優先）
pub const AUDIO_MIME_PATHS: [&[&str]; 2] = [&["mimeType"], &["audio", "mime"]];

/// デコード済みの音声
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioClip {
    /// 保存時の拡張子
    pub fn extension(&self) -> &'static str {
        let mime = self.mime_type.to_ascii_lowercase();
        if mime.contains("mpeg") || mime.contains("mp3") {
            "mp3"
        } else if mime.contains("ogg") {
            "ogg"
        } else if mime.contains("webm") {
            "webm"
        } else {
            "wav"
        }
    }
}

/// 候補パスを順に試して最初に見つかった文字列を返す
fn first_str<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a str> {
    paths.iter().find_map(|path| {
        path.iter()
            .try_fold(value, |v, key| v.get(*key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    })
}

/// TTSレスポンスから音声を取り出す
pub fn extract_audio(value: &Value) -> Result<AudioClip> {
    let payload = first_str(value, &AUDIO_PAYLOAD_PATHS)
        .ok_or_else(|| Error::TtsUnavailable("No audio data from TTS".into()))?;
    let mime_type = first_str(value, &AUDIO_MIME_PATHS).unwrap_or(DEFAULT_AUDIO_MIME);

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::TtsUnavailable(format!("Invalid base64 audio: {}", e)))?;

    Ok(AudioClip {
        bytes,
        mime_type: mime_type.to_string(),
    })
}

/// 通信結果を音声に変換
pub fn interpret_tts_response(
    outcome: std::result::Result<RawResponse, TransportError>,
) -> Result<AudioClip> {
    let response = outcome.map_err(|e| Error::TtsUnavailable(e.0))?;
    if !response.is_success() {
        return Err(Error::TtsUnavailable(format!(
            "TTS endpoint returned status {}",
            response.status
        )));
    }

    let value = decode(response.content_type.as_deref(), &response.body)?;
    extract_audio(&value)
}

/// 再生先
pub trait AudioSink {
    /// 再生中の音声を止めて破棄
    fn stop(&mut self);

    /// 再生開始。完了時には [`Narrator::playback_ended`] を呼ぶこと
    fn play(&mut self, clip: AudioClip) -> Result<()>;

    /// 端末の音声合成で読み上げる。使えなければ false
    fn speak_locally(&mut self, text: &str) -> bool;
}

/// 読み上げの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Remote,
    LocalFallback,
    Silent,
    /// 停止済み、またはより新しい読み上げが始まっていたため破棄
    Discarded,
}

/// 読み上げ制御（同時再生は1つまで）
///
/// `start` ごとに番号を振り、`finish` は最新の番号の応答だけを再生する
#[derive(Debug)]
pub struct Narrator<S: AudioSink> {
    sink: S,
    /// 再生中または応答待ちの読み上げ番号
    active: Option<u64>,
    last_seq: u64,
}

impl<S: AudioSink> Narrator<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            active: None,
            last_seq: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// 読み上げ開始
    ///
    /// 前の再生は先に止める。空テキストは無視して None
    pub fn start(&mut self, text: &str) -> Option<u64> {
        if text.trim().is_empty() {
            return None;
        }
        self.sink.stop();
        self.last_seq += 1;
        self.active = Some(self.last_seq);
        Some(self.last_seq)
    }

    /// TTS応答を受けて再生、失敗時はローカル読み上げ
    ///
    /// `seq` が現在の読み上げでなければ何もしない
    pub fn finish(
        &mut self,
        seq: u64,
        text: &str,
        outcome: std::result::Result<RawResponse, TransportError>,
    ) -> Playback {
        if self.active != Some(seq) {
            tracing::debug!("discarding TTS response #{} (active: {:?})", seq, self.active);
            return Playback::Discarded;
        }

        let played = interpret_tts_response(outcome).and_then(|clip| self.sink.play(clip));

        match played {
            Ok(()) => Playback::Remote,
            Err(err) => {
                tracing::warn!("TTS error: {}", err);
                self.active = None;
                if self.sink.speak_locally(text) {
                    Playback::LocalFallback
                } else {
                    tracing::debug!("local speech synthesis unavailable");
                    Playback::Silent
                }
            }
        }
    }

    /// 自然終了
    pub fn playback_ended(&mut self) {
        self.active = None;
    }

    /// 停止（応答待ちの読み上げも破棄される）
    pub fn stop(&mut self) {
        self.sink.stop();
        self.active = None;
    }

    /// 1回分の読み上げ
    pub async fn speak<T: Transport>(&mut self, transport: &T, config: &ApiConfig, text: &str) -> Playback {
        let Some(seq) = self.start(text) else {
            return Playback::Silent;
        };

        let body = match serde_json::to_string(&TtsRequest { text }) {
            Ok(body) => body,
            Err(e) => return self.finish(seq, text, Err(TransportError(e.to_string()))),
        };
        let outcome = transport.post_json(&config.tts_url(), body).await;
        self.finish(seq, text, outcome)
    }
}
