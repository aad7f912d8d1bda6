//! # StegaMind 客户端 — 命令行入口
//!
//! 本文件仅负责参数解析、日志初始化与结果输出。
//! 业务逻辑分布在库的各子模块中，详见 `lib.rs` 架构文档。

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use stegamind_client::workflow::ResultArtifact;
use stegamind_client::{
    AppError, ClientConfig, LogNotifier, Operation, Payload, Role, WorkflowController,
};

#[derive(Parser, Debug)]
#[command(
    name = "stegamind",
    version,
    about = "Hide, detect and extract images through the StegaMind service"
)]
struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Service base URL, e.g. http://localhost:8000
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Conceal a secret image within a cover image
    Hide {
        #[arg(long)]
        cover: PathBuf,
        #[arg(long)]
        secret: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Analyze an image for hidden steganographic data
    Detect {
        #[arg(long)]
        file: PathBuf,
    },
    /// Recover the secret image hidden within a stego image
    Extract {
        #[arg(long)]
        stego: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Directory to save the result image into
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> ClientConfig {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load_from_path(path),
        None => ClientConfig::default(),
    };
    if let Some(url) = &cli.base_url {
        config.service.base_url = url.clone();
    }
    config
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli);
    let notifier = Arc::new(LogNotifier);

    let (operation, inputs, out_dir) = match cli.command {
        Command::Hide {
            cover,
            secret,
            output,
        } => (
            Operation::Hide,
            vec![(Role::Cover, cover), (Role::Secret, secret)],
            output.out_dir,
        ),
        Command::Detect { file } => (Operation::Detect, vec![(Role::File, file)], None),
        Command::Extract { stego, output } => {
            (Operation::Extract, vec![(Role::Stego, stego)], output.out_dir)
        }
    };

    let controller = WorkflowController::from_config(operation, &config, notifier)?;
    for (role, path) in inputs {
        controller.select(role, Payload::from_path(&path)?)?;
    }

    controller.trigger().await?;

    match controller.result() {
        Some(ResultArtifact::Classification(prediction)) => {
            println!("{}", prediction.class.badge());
            println!("{}", prediction.class.summary());
        }
        Some(ResultArtifact::Image(_)) => {
            let dir = out_dir
                .or(config.download_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            let path = controller.download_result(&dir)?;
            println!("{}", path.display());
        }
        None => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{} ({})", err, err.code());
            ExitCode::FAILURE
        }
    }
}
