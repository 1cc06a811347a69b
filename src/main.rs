use std::path::Path;

use clap::Parser;

use tinylink::cli::{Cli, Commands, ConfigCommands};
use tinylink::config::StaticConfig;
use tinylink::runtime::modes;
use tinylink::system::logging::init_logging;

fn generate_config(output_path: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());
    if Path::new(&path).exists() && !force {
        anyhow::bail!("{} already exists, use --force to overwrite", path);
    }
    StaticConfig::default().save_to_file(&path)?;
    println!("Sample configuration written to {}", path);
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // 生成配置不需要加载配置与日志
    if let Some(Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    }) = cli.command
    {
        return generate_config(output_path, force);
    }

    let config = match StaticConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    // guard 必须存活到进程结束，否则文件日志会丢
    let _guard = init_logging(&config.logging)?;

    match cli.command {
        Some(Commands::Minter) => modes::run_minter(&config).await,
        _ => modes::run_server(&config).await,
    }
}
