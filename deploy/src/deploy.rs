use std::{future::Future, io::Write, sync::Arc};

use anyhow::{bail, Context, Result};
use ethers::{
    abi::Token,
    contract::ContractFactory,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, H256, U64},
};

use crate::{
    contracts::{Artifact, CoreArgs},
    utils::{display_address, parse_wallet},
};

/// A confirmed contract deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub transaction_hash: H256,
    pub block_number: Option<U64>,
}

/// Something that can put a contract on chain and wait for it to be mined.
pub(crate) trait ContractDeployer {
    fn deploy_contract(
        &self,
        artifact: &Artifact,
        args: Vec<Token>,
    ) -> impl Future<Output = Result<Deployment>>;
}

pub struct Deploy<M> {
    client: Arc<M>,
    confirmations: usize,
    legacy: bool,
}

impl Deploy<SignerMiddleware<Provider<Http>, LocalWallet>> {
    pub async fn new(rpc: &str, sk: &str, confirmations: usize, legacy: bool) -> Result<Self> {
        let wallet = parse_wallet(sk)?;
        let provider = Provider::<Http>::try_from(rpc)?;

        let chain_id = provider
            .get_chainid()
            .await
            .with_context(|| format!("failed to reach {rpc}"))?
            .as_u64();
        log::info!("connected to chain {chain_id}, deployer {:?}", wallet.address());

        let client = Arc::new(SignerMiddleware::new(
            provider,
            wallet.with_chain_id(chain_id),
        ));

        Ok(Self::with_client(client, confirmations, legacy))
    }
}

impl<M: Middleware + 'static> Deploy<M> {
    pub fn with_client(client: Arc<M>, confirmations: usize, legacy: bool) -> Self {
        Self {
            client,
            confirmations,
            legacy,
        }
    }

    fn factory(&self, artifact: &Artifact) -> ContractFactory<M> {
        ContractFactory::new(
            artifact.abi.clone(),
            artifact.bytecode.clone(),
            self.client.clone(),
        )
    }
}

impl<M: Middleware + 'static> ContractDeployer for Deploy<M> {
    async fn deploy_contract(&self, artifact: &Artifact, args: Vec<Token>) -> Result<Deployment> {
        let mut deployer = self
            .factory(artifact)
            .deploy_tokens(args)?
            .confirmations(self.confirmations);
        if self.legacy {
            deployer = deployer.legacy();
        }

        log::info!(
            "deploying {}, waiting for {} confirmation(s)",
            artifact.contract_name,
            self.confirmations
        );
        let (contract, receipt) = deployer.send_with_receipt().await?;
        let address = contract.address();

        if receipt.status != Some(U64::from(1)) {
            bail!(
                "deployment transaction {:?} reverted (status {:?})",
                receipt.transaction_hash,
                receipt.status
            );
        }
        let code = self.client.get_code(address, None).await?;
        if code.is_empty() {
            bail!(
                "no code at {} after transaction {:?}",
                display_address(address),
                receipt.transaction_hash
            );
        }

        Ok(Deployment {
            address,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }
}

/// Deploys the core contract once and reports its address on `out`.
///
/// Failures are returned to the caller untouched; nothing is retried.
pub(crate) async fn deploy_core<D: ContractDeployer>(
    deployer: &D,
    artifact: &Artifact,
    args: &CoreArgs,
    out: &mut impl Write,
) -> Result<Deployment> {
    let tokens = args.tokens();
    artifact.check_constructor_args(&tokens)?;

    log::info!(
        "pending: {} (router {}, minimum {}, interval {}s)",
        artifact.contract_name,
        display_address(args.router),
        args.minimum_value,
        args.interval_seconds
    );
    let deployment = match deployer.deploy_contract(artifact, tokens).await {
        Ok(deployment) => deployment,
        Err(e) => {
            log::error!("failed: {} was not deployed", artifact.contract_name);
            return Err(e.context(format!("deployment of {} failed", artifact.contract_name)));
        }
    };
    log::info!(
        "confirmed: tx {:?} in block {}",
        deployment.transaction_hash,
        deployment
            .block_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );

    writeln!(
        out,
        "Core contract deployed at {}",
        display_address(deployment.address)
    )?;
    Ok(deployment)
}
