use clap::Parser;
use narrato::{cli, config, error, library, reader, render, speaker, transport};
use cli::{Cli, Commands, LibraryAction};
use config::Config;
use error::{NarratoError, Result};
use library::LibraryFile;
use narrato_common::{
    filter_by_title, find_sample, generate, Narrator, Playback, Session, SummaryStore,
    UserIdentity, SAMPLE_LIBRARY,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("❌ {}", report(&err));
        std::process::exit(1);
    }
}

/// 生成系のエラーはバナーと同じ文言で表示
fn report(err: &NarratoError) -> String {
    match err {
        NarratoError::Common(e) => e.banner_message(),
        other => other.to_string(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let identity = UserIdentity::new(config.user_id.clone());

    match cli.command {
        Commands::Generate { files, sample, style, doc_type, title, language, output, save, force } => {
            println!("📚 narrato - 要約生成\n");

            let mut session = Session::new();

            // 1. 入力の選択
            if let Some(id) = sample {
                let sample = find_sample(id).ok_or(NarratoError::UnknownSample(id))?;
                session.select_sample(sample);
            } else if !files.is_empty() {
                reader::load_into_session(&mut session, &files).await?;
            } else {
                let labels: Vec<String> = SAMPLE_LIBRARY
                    .iter()
                    .map(|s| format!("{} ({})", s.title, s.doc_type))
                    .collect();
                let index = dialoguer::Select::new()
                    .with_prompt("ライブラリから選択")
                    .items(&labels)
                    .default(0)
                    .interact_opt()?
                    .ok_or(NarratoError::MissingInput)?;
                session.select_sample(&SAMPLE_LIBRARY[index]);
            }

            if let Some(doc_type) = doc_type {
                session.upload.declared_type = doc_type;
            }
            if let Some(title) = title {
                session.upload.title = title;
            }
            if let Some(language) = language {
                session.target_language = language;
            }

            if let Some(warning) = session.upload.warning.clone() {
                if !force {
                    return Err(NarratoError::UnsupportedFile(warning));
                }
                eprintln!("⚠ {}", warning);
            }

            println!(
                "✔ {} ({}, {}文字)\n",
                session.upload.title,
                session.upload.declared_type,
                session.upload.content.chars().count()
            );

            // 保存先は生成前に読んでおく（壊れていたら生成しない）
            let library = if save {
                let path = config.library_path()?;
                let store = LibraryFile::load(&path)?;
                Some((path, store))
            } else {
                None
            };

            // 2. 生成
            let transport = transport::ReqwestTransport::new(config.timeout_seconds)?;
            let spinner = indicatif::ProgressBar::new_spinner();
            spinner.set_message("AI要約中...");
            spinner.enable_steady_tick(Duration::from_millis(120));

            let result = generate(&mut session, &transport, &config.api(), style).await;
            spinner.finish_and_clear();
            let mut record = result?;

            // 3. 保存
            if let Some((path, mut store)) = library {
                let id = store.add_summary(&identity.user_id, record.clone())?;
                LibraryFile::save(store, &path)?;
                record.id = Some(id);
            }

            if let Some(output) = output {
                std::fs::write(&output, serde_json::to_string_pretty(&record)?)?;
                println!("✔ 結果を保存: {}\n", output.display());
            }

            println!("{}", render::render_summary(&record));
            if let Some(id) = &record.id {
                println!("✔ ライブラリに保存しました (ID: {})", id);
            }
        }

        Commands::Speak { text, id, translated, output, no_local_fallback } => {
            let text = match (text, id) {
                (Some(text), _) => text,
                (None, Some(id)) => {
                    let store = LibraryFile::load(&config.library_path()?)?;
                    let record = store
                        .get_summary(&id)
                        .ok_or_else(|| narrato_common::Error::NotFound(format!("summary {}", id)))?;
                    if translated {
                        record
                            .translated_summary_text
                            .ok_or_else(|| narrato_common::Error::NotFound("translation".into()))?
                    } else {
                        record.summary_text
                    }
                }
                (None, None) => return Err(NarratoError::MissingInput),
            };

            let transport = transport::ReqwestTransport::new(config.timeout_seconds)?;
            let mut narrator = Narrator::new(speaker::FileAudioSink::new(&output, !no_local_fallback));

            match narrator.speak(&transport, &config.api(), &text).await {
                Playback::Remote => {
                    if let Some(path) = narrator.sink().written() {
                        println!("🔊 音声を保存: {}", path.display());
                    }
                    narrator.playback_ended();
                }
                Playback::LocalFallback => println!("🔊 端末の音声合成で読み上げました"),
                Playback::Silent | Playback::Discarded => println!("読み上げは利用できませんでした"),
            }
        }

        Commands::Samples => {
            println!("サンプルライブラリ:");
            for sample in SAMPLE_LIBRARY.iter() {
                println!("  {}  {} [{}]", sample.id, sample.title, sample.doc_type);
            }
        }

        Commands::Library { action } => {
            let path = config.library_path()?;
            let mut store = LibraryFile::load(&path)?;

            match action {
                LibraryAction::List { search } => {
                    let records = store.list_summaries(&identity.user_id);
                    let matched = filter_by_title(&records, search.as_deref().unwrap_or(""));
                    if matched.is_empty() {
                        println!("保存済みの要約はありません");
                    }
                    for record in matched {
                        println!("{}", render::render_list_line(record));
                    }
                }
                LibraryAction::Show { id, json } => {
                    let record = store
                        .get_summary(&id)
                        .ok_or_else(|| narrato_common::Error::NotFound(format!("summary {}", id)))?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&record)?);
                    } else {
                        println!("{}", render::render_summary(&record));
                    }
                }
                LibraryAction::Edit { id, text } => {
                    store.update_summary(&id, serde_json::json!({ "summaryText": text }))?;
                    LibraryFile::save(store, &path)?;
                    println!("✔ 更新しました: {}", id);
                }
                LibraryAction::Delete { id } => {
                    store.delete_summary(&id)?;
                    LibraryFile::save(store, &path)?;
                    println!("✔ 削除しました: {}", id);
                }
            }
        }

        Commands::Notes { set } => {
            let path = config.library_path()?;
            let mut store = LibraryFile::load(&path)?;

            if let Some(notes) = set {
                store.set_notes(&identity.user_id, &notes)?;
                LibraryFile::save(store, &path)?;
                println!("✔ メモを保存しました");
            } else {
                match store.get_notes(&identity.user_id) {
                    Some(notes) => println!("{}", notes),
                    None => println!("メモはまだありません"),
                }
            }
        }

        Commands::Config { set_api_url, set_user, show } => {
            let mut config = config;

            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                println!("✔ APIのURLを設定しました");
            }

            if let Some(user) = set_user {
                config.user_id = user;
                config.save()?;
                println!("✔ ユーザーIDを設定しました");
            }

            if show {
                println!("設定:");
                println!("  API: {}", config.api_url());
                println!("  ユーザー: {}", config.user_id);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  ライブラリ: {}", config.library_path()?.display());
            }
        }
    }

    Ok(())
}
