use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use ethers::types::Address;

use crate::{
    contracts::{
        Artifact, CoreArgs, CORE_CONTRACT, DEFAULT_INTERVAL_SECONDS, DEFAULT_MINIMUM_VALUE,
        DEFAULT_ROUTER,
    },
    deploy::{deploy_core, Deploy},
    utils::parse_address,
};

/// Deploys the SoundSphere core contract and prints its address.
#[derive(Debug, Parser)]
pub struct CommandLine {
    /// JSON-RPC endpoint of the target network
    #[clap(short, long, env = "RPC_URL")]
    rpc: String,

    /// Hex private key of the deploying account
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    sk: String,

    /// Hardhat artifacts directory
    #[clap(long, env = "ARTIFACTS_DIR", default_value = "artifacts")]
    artifacts: PathBuf,

    #[clap(long, env = "CONTRACT_NAME", default_value = CORE_CONTRACT)]
    contract: String,

    /// Chainlink router address
    #[clap(
        long,
        env = "ROUTER_ADDRESS",
        default_value = DEFAULT_ROUTER,
        value_parser = parse_address
    )]
    router: Address,

    #[clap(long, env = "MINIMUM_VALUE", default_value_t = DEFAULT_MINIMUM_VALUE)]
    minimum: u64,

    /// Interval in seconds
    #[clap(long, env = "INTERVAL_SECONDS", default_value_t = DEFAULT_INTERVAL_SECONDS)]
    interval: u64,

    #[clap(short, long, env = "CONFIRMATIONS", default_value_t = 1)]
    confirmations: usize,

    /// Send a legacy (pre EIP-1559) transaction
    #[clap(long, env = "LEGACY_TX")]
    legacy: bool,
}

impl CommandLine {
    fn core_args(&self) -> CoreArgs {
        CoreArgs {
            router: self.router,
            minimum_value: self.minimum,
            interval_seconds: self.interval,
        }
    }

    pub async fn execute(self) -> Result<()> {
        let artifact = Artifact::load(&self.artifacts, &self.contract)?;
        let deploy = Deploy::new(&self.rpc, &self.sk, self.confirmations, self.legacy).await?;

        deploy_core(&deploy, &artifact, &self.core_args(), &mut io::stdout().lock()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_core_deployment() {
        let cmd = CommandLine::try_parse_from([
            "deploy",
            "--rpc",
            "http://localhost:8545",
            "--sk",
            "0x01",
        ])
        .unwrap();

        assert_eq!(cmd.artifacts, PathBuf::from("artifacts"));
        assert_eq!(cmd.contract, "SoundSphereCore");
        assert_eq!(cmd.confirmations, 1);
        assert!(!cmd.legacy);
        assert_eq!(
            cmd.core_args(),
            CoreArgs {
                router: parse_address("0x0bf3de8c5d3e8a2b34d2beeb17abfcebaf363a59").unwrap(),
                minimum_value: 1,
                interval_seconds: 60,
            }
        );
    }

    #[test]
    fn overrides_constructor_args() {
        let cmd = CommandLine::try_parse_from([
            "deploy",
            "-r",
            "http://localhost:8545",
            "--sk",
            "0x01",
            "--router",
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "--minimum",
            "5",
            "--interval",
            "120",
            "-c",
            "3",
            "--legacy",
        ])
        .unwrap();

        let args = cmd.core_args();
        assert_eq!(
            args.router,
            parse_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap()
        );
        assert_eq!(args.minimum_value, 5);
        assert_eq!(args.interval_seconds, 120);
        assert_eq!(cmd.confirmations, 3);
        assert!(cmd.legacy);
    }

    #[test]
    fn rejects_bad_router_and_negative_values() {
        let base = ["deploy", "--rpc", "http://localhost:8545", "--sk", "0x01"];

        let bad_router = [&base[..], &["--router", "0x1234"]].concat();
        assert!(CommandLine::try_parse_from(bad_router).is_err());

        let bad_checksum = [
            &base[..],
            &["--router", "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"],
        ]
        .concat();
        assert!(CommandLine::try_parse_from(bad_checksum).is_err());

        let negative = [&base[..], &["--minimum", "-1"]].concat();
        assert!(CommandLine::try_parse_from(negative).is_err());
    }

    #[tokio::test]
    async fn missing_artifact_fails_before_touching_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = CommandLine::try_parse_from([
            "deploy",
            "--rpc",
            "http://127.0.0.1:1",
            "--sk",
            "0x01",
            "--artifacts",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();

        let err = cmd.execute().await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
