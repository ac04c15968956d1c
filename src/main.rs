// 藏品生成器命令行入口
// 解析参数、加载配置、初始化日志，然后交给生成引擎

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{error, info};

use traitmint::core::ConfigManager;
use traitmint::utils::init_logger;
use traitmint::{CollectionEngine, GenerationError, GenerationRequest, GeneratorConfig};

#[derive(Debug, Parser)]
#[command(name = "traitmint", version, about = "Generate unique layered collectibles from a weighted trait table")]
struct Cli {
    /// TOML配置文件，不存在时写出默认配置
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate AMOUNT images, metadata and rarity statistics into OUT_DIR.
    ///
    /// IN_FILE is a CSV file with the header `Type,Name,Rarity Weight,Image Path`.
    /// Image paths are relative to IN_FILE; rows are layered in category order.
    Generate {
        token_name: String,
        #[arg(value_name = "IN_FILE")]
        in_file: PathBuf,
        #[arg(value_name = "OUT_DIR")]
        out_dir: PathBuf,
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        amount: u64,
        /// Seed for a reproducible collection
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        init_logger("info");
        let code = exit_code(&e);
        if code == 2 {
            error!("输入有误，请检查特征表、图层或参数: {:#}", e);
        } else {
            error!("生成失败: {:#}", e);
        }
        std::process::exit(code);
    }
}

/// 输入错误返回2，运行环境错误返回1
fn exit_code(error: &anyhow::Error) -> i32 {
    let input_error = error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<GenerationError>())
        .any(GenerationError::is_input_error);
    if input_error {
        2
    } else {
        1
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigManager::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    init_logger(&config.general.log_level);
    info!("启动 {} v{}", traitmint::NAME, traitmint::VERSION);

    match cli.command {
        Command::Generate { token_name, in_file, out_dir, amount, seed } => {
            let amount = usize::try_from(amount).context("amount does not fit in memory")?;
            let request = GenerationRequest { token_name, amount, seed };

            let engine = CollectionEngine::new(config)?;
            let report = engine
                .generate(&request, &in_file, &out_dir)
                .with_context(|| format!("failed to generate from {}", in_file.display()))?;

            info!(
                "完成: {} 个藏品, 种子 {}, 输出目录 {}",
                report.set.len(),
                report.seed,
                report.output_dir.display()
            );
        }
    }

    Ok(())
}
