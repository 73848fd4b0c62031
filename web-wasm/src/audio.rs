//! ブラウザでの音声再生
//!
//! 合成音声は Blob URL + HtmlAudioElement で再生し、フォールバックは speechSynthesis

use narrato_common::error::{Error, Result};
use narrato_common::{AudioClip, AudioSink};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlAudioElement, SpeechSynthesisUtterance, Url};

fn js_message(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// 再生中の音声
struct ActiveAudio {
    element: HtmlAudioElement,
    object_url: String,
    _on_ended: Closure<dyn FnMut()>,
}

pub struct BrowserAudioSink {
    active: Option<ActiveAudio>,
    on_ended: Rc<dyn Fn()>,
}

impl BrowserAudioSink {
    /// `on_ended` は音声が最後まで再生されたときに呼ばれる
    pub fn new(on_ended: impl Fn() + 'static) -> Self {
        Self {
            active: None,
            on_ended: Rc::new(on_ended),
        }
    }
}

impl AudioSink for BrowserAudioSink {
    fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.element.set_onended(None);
            let _ = active.element.pause();
            let _ = Url::revoke_object_url(&active.object_url);
        }
        if let Some(synth) = web_sys::window().and_then(|w| w.speech_synthesis().ok()) {
            synth.cancel();
        }
    }

    fn play(&mut self, clip: AudioClip) -> Result<()> {
        // 前の要素はonendedごと外す
        self.stop();

        let bytes = js_sys::Uint8Array::from(clip.bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&bytes);

        let bag = BlobPropertyBag::new();
        bag.set_type(&clip.mime_type);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &bag)
            .map_err(|e| Error::TtsUnavailable(js_message(e)))?;
        let object_url = Url::create_object_url_with_blob(&blob)
            .map_err(|e| Error::TtsUnavailable(js_message(e)))?;

        let element = match HtmlAudioElement::new_with_src(&object_url) {
            Ok(element) => element,
            Err(e) => {
                let _ = Url::revoke_object_url(&object_url);
                return Err(Error::TtsUnavailable(js_message(e)));
            }
        };

        let on_ended = {
            let callback = Rc::clone(&self.on_ended);
            let url = object_url.clone();
            Closure::wrap(Box::new(move || {
                let _ = Url::revoke_object_url(&url);
                callback();
            }) as Box<dyn FnMut()>)
        };
        element.set_onended(Some(on_ended.as_ref().unchecked_ref()));

        // 自動再生の拒否はPromise側で起きるので、ここでは呼び出しの失敗だけ見る
        element
            .play()
            .map_err(|e| Error::TtsUnavailable(js_message(e)))?;

        self.active = Some(ActiveAudio {
            element,
            object_url,
            _on_ended: on_ended,
        });
        Ok(())
    }

    fn speak_locally(&mut self, text: &str) -> bool {
        let Some(synth) = web_sys::window().and_then(|w| w.speech_synthesis().ok()) else {
            return false;
        };
        match SpeechSynthesisUtterance::new_with_text(text) {
            Ok(utterance) => {
                synth.cancel();
                synth.speak(&utterance);
                true
            }
            Err(_) => false,
        }
    }
}
