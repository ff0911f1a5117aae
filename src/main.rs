use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dicom_denoise::{
    BinRule, BorderMode, ConvolutionConfig, Kernel, SnrConfig, UidPolicy, denoise_directory,
    histogram_of_directory, snr_of_directory,
};
use log::info;

#[derive(Parser)]
#[command(name = "dicom-denoise")]
#[command(about = "Validate DICOM slice stacks and derive denoised slices, histograms and SNR")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Filter every slice with a box kernel and write *_denoised.dcm files
    Denoise {
        #[arg(short, long, default_value = "./input")]
        input: PathBuf,

        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Edge length of the box kernel
        #[arg(short, long, default_value_t = 5)]
        kernel_size: usize,

        #[arg(long, value_enum, default_value_t = BorderArg::Reflect101)]
        border: BorderArg,

        #[arg(long, value_enum, default_value_t = UidPolicyArg::Shared)]
        uid_policy: UidPolicyArg,
    },
    /// Print the intensity histogram of the volume
    Histogram {
        #[arg(short, long, default_value = "./input")]
        input: PathBuf,

        /// auto, sturges, fd or a fixed bin count
        #[arg(short, long, default_value = "auto", value_parser = parse_bins)]
        bins: BinRule,
    },
    /// Print the signal to noise ratio of the volume
    Snr {
        #[arg(short, long, default_value = "./input")]
        input: PathBuf,

        #[arg(short, long, default_value_t = 5)]
        kernel_size: usize,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum BorderArg {
    Reflect101,
    Replicate,
    Zero,
}

impl From<BorderArg> for BorderMode {
    fn from(arg: BorderArg) -> Self {
        match arg {
            BorderArg::Reflect101 => BorderMode::Reflect101,
            BorderArg::Replicate => BorderMode::Replicate,
            BorderArg::Zero => BorderMode::Zero,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum UidPolicyArg {
    Shared,
    PerSlice,
}

impl From<UidPolicyArg> for UidPolicy {
    fn from(arg: UidPolicyArg) -> Self {
        match arg {
            UidPolicyArg::Shared => UidPolicy::SharedOffset,
            UidPolicyArg::PerSlice => UidPolicy::PerSlice,
        }
    }
}

fn parse_bins(value: &str) -> Result<BinRule, String> {
    match value.to_ascii_lowercase().as_str() {
        "auto" => Ok(BinRule::Auto),
        "sturges" => Ok(BinRule::Sturges),
        "fd" => Ok(BinRule::FreedmanDiaconis),
        other => other
            .parse::<usize>()
            .ok()
            .filter(|&count| count > 0)
            .map(BinRule::Count)
            .ok_or_else(|| format!("expected auto, sturges, fd or a bin count, got '{value}'")),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Denoise {
            input,
            output,
            kernel_size,
            border,
            uid_policy,
        } => {
            let kernel = Kernel::box_average(kernel_size)
                .with_context(|| format!("Invalid kernel size {kernel_size}"))?;
            let config = ConvolutionConfig::default()
                .with_kernel(kernel)
                .with_border(border.into())
                .with_uid_policy(uid_policy.into());
            let report = denoise_directory(&input, &output, &config)
                .with_context(|| format!("Failed to denoise '{}'", input.display()))?;
            info!(
                "Wrote {} files for series {}",
                report.written.len(),
                report.series_identifier
            );
        }
        Command::Histogram { input, bins } => {
            let report = histogram_of_directory(&input, bins)
                .with_context(|| format!("Failed to compute histogram of '{}'", input.display()))?;
            println!("Histogram for scan {}", report.series_number);
            for (edge, count) in report.histogram.bins() {
                println!("{edge}\t{count}");
            }
        }
        Command::Snr { input, kernel_size } => {
            let report = snr_of_directory(&input, SnrConfig { kernel_size })
                .with_context(|| format!("Failed to compute SNR of '{}'", input.display()))?;
            println!("SNR for scan {}: {}", report.series_number, report.snr);
        }
    }

    Ok(())
}
