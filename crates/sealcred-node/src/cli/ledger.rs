use super::commands::{CallArgs, OutputFormat};
use super::utils::{parse_attestation, print_line, print_output, read_proof};
use anyhow::{bail, Result};
use sealcred_ledger::LedgerParams;
use sealcred_node::{decode_signals, LedgerKind, LedgerService};
use sealcred_types::{EthAddress, FieldElement, Network};
use serde::Serialize;
use std::fmt;
use std::path::Path;

pub struct DeployRequest {
    pub family: LedgerKind,
    pub owner: EthAddress,
    pub verifier: EthAddress,
    pub attestor: FieldElement,
    pub network: Option<Network>,
    pub ecdsa_attestor: Option<EthAddress>,
    pub seal_hub: Option<EthAddress>,
    pub base_uri: String,
    pub version: String,
}

pub async fn deploy(service: &LedgerService, request: DeployRequest, format: &OutputFormat) -> Result<()> {
    if request.network.is_some() && !request.family.has_network() {
        bail!("--network only applies to balance ledgers");
    }
    if request.ecdsa_attestor.is_some() && request.family != LedgerKind::ExternalErc721 {
        bail!("--ecdsa-attestor only applies to external_erc721 ledgers");
    }

    let record = service
        .deploy(
            request.family,
            request.owner,
            LedgerParams {
                verifier_contract: request.verifier,
                attestor_public_key: request.attestor,
                network: request.network,
                attestor_ecdsa_address: request.ecdsa_attestor,
                seal_hub: request.seal_hub,
                base_uri: request.base_uri,
                version: request.version,
            },
        )
        .await?;
    print_output(format, &record)
}

pub async fn mint(
    service: &LedgerService,
    call: CallArgs,
    proof: &Path,
    original: Option<&str>,
    message: Option<&str>,
    signature: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let proof = read_proof(proof)?;
    let attestation = parse_attestation(message, signature)?;
    let receipt = service
        .mint(&call.ledger, call.caller, original, &proof, attestation.as_ref())
        .await?;
    print_output(format, &receipt)
}

#[derive(Serialize)]
struct NullifierStatus {
    nullifier: FieldElement,
    used: bool,
}

impl fmt::Display for NullifierStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.used { "used" } else { "unused" };
        write!(f, "Nullifier {}: {}", self.nullifier, state)
    }
}

pub async fn derivative(
    service: &LedgerService,
    ledger: &EthAddress,
    target: &str,
    by_address: bool,
    nullifier: Option<FieldElement>,
    format: &OutputFormat,
) -> Result<()> {
    let address = if by_address {
        target.parse::<EthAddress>()?
    } else {
        match service.get_derivative(ledger, target).await? {
            Some(address) => address,
            None => bail!("no derivative registered for {}", target),
        }
    };

    print_output(format, &service.derivative_info(ledger, &address).await?)?;
    if let Some(nullifier) = nullifier {
        let used = service.is_nullifier_used(ledger, &address, &nullifier).await?;
        print_line(format, &NullifierStatus { nullifier, used })?;
    }
    Ok(())
}

pub async fn balance(
    service: &LedgerService,
    ledger: &EthAddress,
    original: &str,
    account: &EthAddress,
    format: &OutputFormat,
) -> Result<()> {
    print_line(format, &service.balance_of(ledger, original, account).await?)
}

pub async fn token_uri(
    service: &LedgerService,
    ledger: &EthAddress,
    derivative: &EthAddress,
    token_id: u64,
    format: &OutputFormat,
) -> Result<()> {
    print_line(format, &service.token_uri(ledger, derivative, token_id).await?)
}

pub async fn set_verifier(service: &LedgerService, call: CallArgs, verifier: EthAddress) -> Result<()> {
    service
        .set_verifier_contract(&call.ledger, &call.caller, verifier)
        .await?;
    println!("\x1b[38;5;46m[+]\x1b[0m Verifier set to {}", verifier);
    Ok(())
}

pub async fn set_base_uri(
    service: &LedgerService,
    call: CallArgs,
    base_uri: &str,
    derivative: Option<EthAddress>,
) -> Result<()> {
    service
        .set_base_uri(&call.ledger, &call.caller, base_uri, derivative.as_ref())
        .await?;
    println!("\x1b[38;5;46m[+]\x1b[0m Base URI set to {}", base_uri);
    Ok(())
}

pub async fn delete_original(service: &LedgerService, call: CallArgs, original: &str) -> Result<()> {
    service.delete_original(&call.ledger, &call.caller, original).await?;
    println!("\x1b[38;5;46m[+]\x1b[0m Original {} unregistered", original);
    Ok(())
}

pub async fn transfer_ownership(service: &LedgerService, call: CallArgs, new_owner: EthAddress) -> Result<()> {
    service
        .transfer_ownership(&call.ledger, &call.caller, new_owner)
        .await?;
    println!("\x1b[38;5;46m[+]\x1b[0m Ownership transferred to {}", new_owner);
    Ok(())
}

pub fn decode(family: LedgerKind, proof: &Path, format: &OutputFormat) -> Result<()> {
    let proof = read_proof(proof)?;
    print_output(format, &decode_signals(family, &proof.input)?)
}
