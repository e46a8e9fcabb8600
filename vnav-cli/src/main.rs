#![warn(clippy::pedantic)]
#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]

use clap::Parser;

fn main() -> anyhow::Result<()> { vnav_cli::run(vnav_cli::Options::parse()) }
