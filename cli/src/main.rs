mod command;
mod config;
mod render;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use command::{Command, HELP};
use config::Config;
use render::render;
use todo_core::{Controller, HttpTodoApi};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so they never interleave with the drawn list.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!(base_url = %config.base_url, user_id = config.user_id, "starting");

    let api = HttpTodoApi::new(&config.base_url, config.user_id, config.request_timeout())
        .context("building http client")?;
    let api = Arc::new(api);
    let mut controller = Controller::mount(api, config.controller_config());
    controller.settle().await;
    print!("{}", render(&controller.view()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let outstanding = controller.has_outstanding();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(error) => {
                        eprintln!("{error}");
                        continue;
                    }
                };
                match command {
                    Command::Quit => break,
                    Command::Help => {
                        println!("{HELP}");
                        continue;
                    }
                    command => {
                        for action in command.into_actions(controller.state()) {
                            controller.dispatch(action);
                        }
                        controller.settle().await;
                        controller.take_focus_request();
                    }
                }
                print!("{}", render(&controller.view()));
            }
            true = controller.next(), if outstanding => {
                print!("{}", render(&controller.view()));
            }
        }
    }

    controller.unmount();
    Ok(())
}
