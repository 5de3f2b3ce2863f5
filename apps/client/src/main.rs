use anyhow::Context;
use lumi_client::{Action, ClientConfig, LumiApp};
use lumi_core::Priority;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    let mut app = LumiApp::from_config(&config);

    if !app.boot().await {
        eprintln!("{}", app.banner().unwrap_or("Backend unreachable"));
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("add") => {
            let title = args.get(1).context("usage: lumi add <title> [priority]")?;
            let priority = match args.get(2) {
                Some(p) => p.parse()?,
                None => Priority::default(),
            };
            app.dispatch(Action::AddTask {
                title: title.clone(),
                priority,
            })
            .await?;
        }
        Some("done") => {
            let id = args.get(1).context("usage: lumi done <task-id>")?;
            app.dispatch(Action::ToggleTask(id.parse()?)).await?;
        }
        Some("capture") => {
            let content = args[1..].join(" ");
            app.dispatch(Action::AddCapture(content)).await?;
        }
        Some(other) => anyhow::bail!("unknown command: {other}"),
        None => {}
    }

    let stats = app.stats.stats();
    println!(
        "Level {} · {} pts ({} to next) · {} tasks · {} focus min",
        stats.level,
        stats.total_points,
        stats.points_to_next_level(),
        stats.tasks_completed,
        stats.focus_minutes()
    );
    for task in app.visible_tasks() {
        println!("[{}] {} ({})", task.priority, task.title, task.id);
    }

    Ok(())
}
