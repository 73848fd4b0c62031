//! CLI用の再生先
//!
//! 合成音声はファイルに書き出し、フォールバックは端末の読み上げコマンドを使う

use narrato_common::error::{Error, Result};
use narrato_common::{AudioClip, AudioSink};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// ローカル読み上げコマンドの候補（先頭から順に試す）
const LOCAL_SPEECH_COMMANDS: [&str; 3] = ["say", "espeak-ng", "espeak"];

pub struct FileAudioSink {
    /// 拡張子を除いた出力先
    output_stem: PathBuf,
    written: Option<PathBuf>,
    allow_local: bool,
}

impl FileAudioSink {
    pub fn new(output: &Path, allow_local: bool) -> Self {
        Self {
            output_stem: output.with_extension(""),
            written: None,
            allow_local,
        }
    }

    /// 最後に書き出したファイル
    pub fn written(&self) -> Option<&Path> {
        self.written.as_deref()
    }
}

impl AudioSink for FileAudioSink {
    fn stop(&mut self) {
        self.written = None;
    }

    fn play(&mut self, clip: AudioClip) -> Result<()> {
        let path = self.output_stem.with_extension(clip.extension());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &clip.bytes)
            .map_err(|e| Error::TtsUnavailable(format!("cannot write {}: {}", path.display(), e)))?;

        tracing::info!("wrote {} bytes of {} to {}", clip.bytes.len(), clip.mime_type, path.display());
        self.written = Some(path);
        Ok(())
    }

    fn speak_locally(&mut self, text: &str) -> bool {
        if !self.allow_local {
            return false;
        }

        LOCAL_SPEECH_COMMANDS.iter().any(|cmd| {
            match Command::new(cmd)
                .arg(text)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                Ok(status) if status.success() => true,
                Ok(status) => {
                    tracing::debug!("{} exited with {}", cmd, status);
                    false
                }
                Err(_) => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_writes_file_with_mime_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileAudioSink::new(&dir.path().join("summary.wav"), false);

        sink.play(AudioClip {
            bytes: b"ID3".to_vec(),
            mime_type: "audio/mpeg".into(),
        })
        .unwrap();

        let written = sink.written().unwrap().to_path_buf();
        assert_eq!(written.extension().unwrap(), "mp3");
        assert_eq!(std::fs::read(&written).unwrap(), b"ID3");

        sink.stop();
        assert!(sink.written().is_none());
    }

    #[test]
    fn test_local_speech_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileAudioSink::new(&dir.path().join("a"), false);
        assert!(!sink.speak_locally("hello"));
    }
}
