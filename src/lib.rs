//! Narrato CLI
//!
//! 共通ライブラリ（narrato-common）のパイプラインをreqwestとファイル保存で動かす

pub mod cli;
pub mod config;
pub mod error;
pub mod library;
pub mod reader;
pub mod render;
pub mod speaker;
pub mod transport;
