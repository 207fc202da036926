use anyhow::Context as _;
use clap::Parser as _;
use net_load_analysis::{
    cli::{Args, Command},
    config::{AnalyzeConfig, BuildConfig},
    logger, pipeline,
};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logger::init();

    match Args::parse().command {
        Command::Run(args) => {
            pipeline::run(&BuildConfig::from(&*args), &AnalyzeConfig::from(&*args))
                .context("net load run failed")?;
        }
        Command::Build(args) => {
            pipeline::build(&BuildConfig::from(&*args))
                .context("unable to build the net load table")?;
        }
        Command::Analyze(args) => {
            pipeline::analyze(&AnalyzeConfig::from(&args))
                .context("unable to analyze net load cyclicality")?;
        }
    }
    Ok(())
}
