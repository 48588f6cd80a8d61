use clap::Parser;
use dialoguer::Confirm;
use job_tracker::{cli, config, error, logging, render};
use job_tracker::{open_tracker, resolve_data_path};
use cli::{Cli, Commands, ImportFormat};
use config::Config;
use error::{Result, TrackerError};
use job_tracker_common::{Action, NewRecord, Outcome, SectionVisibility};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load()?;
    let data_path = resolve_data_path(cli.data_file.as_deref(), &config)?;
    debug!("data file: {}", data_path.display());

    match cli.command {
        Commands::List { sort, direction, toggle, all } => {
            let mut tracker = open_tracker(&data_path, &config)?;
            if all {
                tracker = tracker.with_visibility(SectionVisibility::all_expanded());
            }

            if let Some(field) = sort {
                tracker.dispatch(Action::SetSort(field))?;
            }
            if let Some(direction) = direction {
                if tracker.sort().direction != direction {
                    let field = tracker.sort().field;
                    tracker.dispatch(Action::SetSort(field))?;
                }
            }
            for status in toggle {
                tracker.dispatch(Action::ToggleSection(status))?;
            }

            print!("{}", render::render_snapshot(&tracker.snapshot()));
        }

        Commands::Stats => {
            let tracker = open_tracker(&data_path, &config)?;
            println!("{}", render::render_stats(&tracker.stats()));
        }

        Commands::Add { company, role, date, status, link, notes } => {
            let mut tracker = open_tracker(&data_path, &config)?;
            subscribe_summary(&mut tracker);

            let outcome = tracker.dispatch(Action::Create(NewRecord {
                company,
                role,
                date: date.unwrap_or_default(),
                status,
                notes: notes.unwrap_or_default(),
                link,
            }))?;
            if let Outcome::Created(id) = outcome {
                println!("✔ 追加しました (ID: {})", id);
            }
        }

        Commands::Rm { id, yes } => {
            let mut tracker = open_tracker(&data_path, &config)?;

            let Some(record) = tracker.records().iter().find(|r| r.id == id).cloned() else {
                println!("応募が見つかりません: ID {}", id);
                return Ok(());
            };

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("{} / {} を削除しますか？", record.company, record.role))
                    .default(false)
                    .interact()
                    .map_err(|e| TrackerError::Prompt(e.to_string()))?;
                if !confirmed {
                    return Err(TrackerError::Cancelled);
                }
            }

            subscribe_summary(&mut tracker);
            tracker.dispatch(Action::Delete { id })?;
            println!("✔ 削除しました (ID: {})", id);
        }

        Commands::Status { id, status } => {
            let mut tracker = open_tracker(&data_path, &config)?;
            subscribe_summary(&mut tracker);
            let outcome = tracker.dispatch(Action::UpdateStatus { id, status })?;
            report_update(outcome, id);
        }

        Commands::FollowUp { id, follow_up } => {
            let mut tracker = open_tracker(&data_path, &config)?;
            subscribe_summary(&mut tracker);
            let outcome = tracker.dispatch(Action::UpdateFollowUp { id, follow_up })?;
            report_update(outcome, id);
        }

        Commands::Notes { id, notes } => {
            let mut tracker = open_tracker(&data_path, &config)?;
            subscribe_summary(&mut tracker);
            let outcome = tracker.dispatch(Action::UpdateNotes { id, notes })?;
            report_update(outcome, id);
        }

        Commands::Import { input, format } => {
            if !input.exists() {
                return Err(TrackerError::FileNotFound(input.display().to_string()));
            }
            let format = match format.or_else(|| ImportFormat::from_path(&input)) {
                Some(format) => format,
                None => {
                    return Err(TrackerError::UnsupportedFormat(input.display().to_string()));
                }
            };

            println!("📥 取り込み中 ({}): {}", format, input.display());
            let text = tokio::fs::read_to_string(&input).await?;

            let mut tracker = open_tracker(&data_path, &config)?;
            subscribe_summary(&mut tracker);
            let action = match format {
                ImportFormat::Csv => Action::ImportCsv(text),
                ImportFormat::Json => Action::ImportJson(text),
            };

            if let Outcome::Imported(report) = tracker.dispatch(action)? {
                println!("✔ {}件を追加（スキップ {}件）", report.added, report.skipped);
                if report.auto_rejected > 0 {
                    println!("  自動不採用: {}件", report.auto_rejected);
                }
            }
        }

        Commands::Export { output } => {
            let mut tracker = open_tracker(&data_path, &config)?;
            let output_dir = output.unwrap_or_else(|| std::path::PathBuf::from("."));

            if let Outcome::Exported(file) = tracker.dispatch(Action::Export)? {
                tokio::fs::create_dir_all(&output_dir).await?;
                let path = output_dir.join(&file.file_name);
                tokio::fs::write(&path, file.contents).await?;
                println!("✔ バックアップを保存: {}", path.display());
            }
        }

        Commands::Config { set_data_file, show } => {
            let mut config = config;

            if let Some(path) = set_data_file {
                config.set_data_file(path)?;
                println!("✔ データファイルを設定しました");
            }

            if show {
                println!("設定:");
                println!("  データファイル: {}", config.data_path()?.display());
                println!("  並べ替え: {} ({})", config.sort_field, config.sort_direction);
                println!(
                    "  不採用セクション: {}",
                    if config.expanded_rejected { "展開" } else { "折りたたみ" }
                );
            }
        }
    }

    Ok(())
}

/// 変更後に集計行を表示する
fn subscribe_summary(tracker: &mut job_tracker_common::Tracker) {
    tracker.subscribe(|snapshot| {
        println!("{}", render::render_stats(&snapshot.stats));
    });
}

/// 存在しないIDへの更新は何もしない（エラーにはしない）
fn report_update(outcome: Outcome, id: i64) {
    match outcome {
        Outcome::Applied(true) => println!("✔ 更新しました (ID: {})", id),
        _ => println!("応募が見つかりません: ID {}", id),
    }
}
