use crate::*;
use proptest::prelude::*;
use sealcred_crypto::{create_address, eth_address, random_private_key, FixedVerifier};
use sealcred_types::{EthAddress, FieldElement, Network, SealCredError, ZkProof};
use std::sync::Arc;

const ATTESTOR: &str =
    "13578469780849928704623562188688413596472689853032556827882124682666588837591";
const INVALID_ATTESTOR: &str =
    "35964726898530325568278821246826665888375911357846978084992870462356218868841";
const METADATA_URL: &str = "https://metadata.sealcred.xyz/metadata";
const NEW_METADATA_URL: &str = "https://metadata-v2.sealcred.xyz/metadata";

fn attestor() -> FieldElement {
    FieldElement::from_dec_str(ATTESTOR).unwrap()
}

fn invalid_attestor() -> FieldElement {
    FieldElement::from_dec_str(INVALID_ATTESTOR).unwrap()
}

fn owner() -> EthAddress {
    EthAddress::from_bytes([0x01; 20])
}

fn user() -> EthAddress {
    EthAddress::from_bytes([0x02; 20])
}

fn ledger_address() -> EthAddress {
    EthAddress::from_bytes([0x10; 20])
}

fn verifier_address() -> EthAddress {
    EthAddress::from_bytes([0xfe; 20])
}

fn collection() -> EthAddress {
    EthAddress::from_hex("0xAAAaaaaAAAaaaaaaAaAaaaaaAAaAAAAaaaaaAAAa").unwrap()
}

fn other_collection() -> EthAddress {
    EthAddress::from_bytes([0xbb; 20])
}

struct Fixture {
    chain: MemoryChain,
    verifier: Arc<FixedVerifier>,
}

impl Fixture {
    fn new(verifies: bool) -> Self {
        let mut chain = MemoryChain::new();
        let verifier = Arc::new(FixedVerifier::new(verifies));
        chain.add_verifier(verifier_address(), verifier.clone());
        chain.add_collection(collection(), "Fake ERC721", "FAKE");
        chain.add_collection(other_collection(), "Other ERC721", "OTHER");
        Self { chain, verifier }
    }

    fn set_verifier_result(&mut self, verifies: bool) {
        self.verifier = Arc::new(FixedVerifier::new(verifies));
        self.chain
            .add_verifier(verifier_address(), self.verifier.clone());
    }
}

fn params(network: Option<Network>) -> LedgerParams {
    LedgerParams {
        verifier_contract: verifier_address(),
        attestor_public_key: attestor(),
        network,
        attestor_ecdsa_address: None,
        seal_hub: None,
        base_uri: METADATA_URL.to_string(),
        version: "0.0.1".to_string(),
    }
}

fn erc721_ledger() -> Ledger<Erc721Family> {
    Ledger::new(ledger_address(), owner(), params(Some(Network::Goerli))).unwrap()
}

fn balance_input(
    origin: &EthAddress,
    network: Network,
    nullifier: u64,
    attestor: FieldElement,
) -> Vec<FieldElement> {
    vec![
        FieldElement::from_u64(family::BALANCE_ATTESTATION),
        FieldElement::from_address(origin),
        FieldElement::from_u64(0),
        FieldElement::from_u64(network.code() as u64),
        FieldElement::from_u64(1),
        FieldElement::from_u64(0),
        FieldElement::from_u64(nullifier),
        attestor,
    ]
}

fn balance_proof(origin: &EthAddress, network: Network, nullifier: u64) -> ZkProof {
    ZkProof::with_input(balance_input(origin, network, nullifier, attestor()))
}

fn email_proof(domain: &str, nullifier: u64) -> ZkProof {
    let mut input = signals::encode_padded_string(domain, family::EMAIL_DOMAIN_LEN).unwrap();
    input.push(FieldElement::from_u64(nullifier));
    input.push(attestor());
    ZkProof::with_input(input)
}

fn farcaster_proof(nullifier: u64, attestation_type: u64, keyword: &str) -> ZkProof {
    let mut input = vec![FieldElement::from_u64(attestation_type)];
    input.extend(keyword.bytes().map(|b| FieldElement::from_u64(b as u64)));
    input.push(FieldElement::from_u64(nullifier));
    input.push(attestor());
    ZkProof::with_input(input)
}

#[test]
fn test_mint_deploys_derivative() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();

    let receipt = ledger
        .mint(user(), &collection(), &balance_proof(&collection(), Network::Goerli, 123), &fixture.chain)
        .unwrap();

    assert!(receipt.created);
    assert_eq!(receipt.token_id, 0);
    assert_eq!(receipt.to, user());
    assert_eq!(receipt.derivative, create_address(&ledger_address(), 1));
    assert_eq!(ledger.get_derivative(&collection()), Some(receipt.derivative));
    assert_eq!(ledger.balance_of(&collection(), &user()), 1);
    assert_eq!(ledger.balance_of(&collection(), &owner()), 0);
    assert_eq!(ledger.nonce(), 2);

    let derivative = ledger.derivative(&receipt.derivative).unwrap();
    assert_eq!(derivative.name(), "Fake ERC721 (derivative)");
    assert_eq!(derivative.symbol(), "FAKE-d");
    assert_eq!(derivative.version(), "0.0.1");
    assert_eq!(derivative.ledger(), ledger_address());
    assert_eq!(derivative.owner_of(0).unwrap(), user());
    assert_eq!(derivative.total_supply(), 1);
    assert!(derivative.is_nullifier_used(&FieldElement::from_u64(123)));

    assert_eq!(
        ledger.events(),
        &[
            LedgerEvent::CreateDerivative {
                original: collection().to_string(),
                derivative: receipt.derivative,
            },
            LedgerEvent::Mint {
                derivative: receipt.derivative,
                to: user(),
                token_id: 0,
            },
        ]
    );
}

#[test]
fn test_second_mint_reuses_derivative() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();

    let first = ledger
        .mint(user(), &collection(), &balance_proof(&collection(), Network::Goerli, 1), &fixture.chain)
        .unwrap();
    let second = ledger
        .mint(owner(), &collection(), &balance_proof(&collection(), Network::Goerli, 2), &fixture.chain)
        .unwrap();

    assert!(!second.created);
    assert_eq!(first.derivative, second.derivative);
    assert_eq!(second.token_id, 1);
    assert_eq!(ledger.derivatives().count(), 1);
    assert_eq!(ledger.nonce(), 2);
}

#[test]
fn test_invalid_proof_leaves_no_trace() {
    let fixture = Fixture::new(false);
    let mut ledger = erc721_ledger();

    let result = ledger.mint(
        user(),
        &collection(),
        &balance_proof(&collection(), Network::Goerli, 123),
        &fixture.chain,
    );

    assert_eq!(result, Err(SealCredError::InvalidProof));
    assert_eq!(ledger.get_derivative(&collection()), None);
    assert_eq!(ledger.balance_of(&collection(), &user()), 0);
    assert_eq!(ledger.deployed().count(), 0);
    assert_eq!(ledger.nonce(), 1);
    assert!(ledger.events().is_empty());
}

#[test]
fn test_wrong_network_rejected() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();

    let result = ledger.mint(
        user(),
        &collection(),
        &balance_proof(&collection(), Network::Mainnet, 123),
        &fixture.chain,
    );
    assert_eq!(result, Err(SealCredError::WrongNetwork));
    assert_eq!(fixture.verifier.calls(), 0);
}

#[test]
fn test_replayed_nullifier_rejected() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let proof = balance_proof(&collection(), Network::Goerli, 123);

    ledger.mint(user(), &collection(), &proof, &fixture.chain).unwrap();
    assert_eq!(
        ledger.mint(owner(), &collection(), &proof, &fixture.chain),
        Err(SealCredError::ProofAlreadyUsed)
    );
    assert_eq!(fixture.verifier.calls(), 1);
    assert_eq!(ledger.balance_of(&collection(), &owner()), 0);
}

#[test]
fn test_wrong_attestor_rejected_before_verifier() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let proof = ZkProof::with_input(balance_input(
        &collection(),
        Network::Goerli,
        123,
        invalid_attestor(),
    ));

    assert_eq!(
        ledger.mint(user(), &collection(), &proof, &fixture.chain),
        Err(SealCredError::WrongAttestor)
    );
    assert_eq!(fixture.verifier.calls(), 0);
}

#[test]
fn test_origin_mismatch_rejected_before_verifier() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();

    let proof = balance_proof(&other_collection(), Network::Goerli, 123);
    assert_eq!(
        ledger.mint(user(), &collection(), &proof, &fixture.chain),
        Err(SealCredError::WrongTokenAddress)
    );
    assert_eq!(fixture.verifier.calls(), 0);
    assert_eq!(ledger.get_derivative(&collection()), None);
}

#[test]
fn test_invalid_attestation_type() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let mut input = balance_input(&collection(), Network::Goerli, 123, attestor());
    input[0] = FieldElement::from_u64(2);

    assert_eq!(
        ledger.mint(user(), &collection(), &ZkProof::with_input(input), &fixture.chain),
        Err(SealCredError::InvalidAttestationType(2))
    );
}

#[test]
fn test_token_ownership_attestation_accepted() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let mut input = balance_input(&collection(), Network::Goerli, 123, attestor());
    input[0] = FieldElement::from_u64(family::TOKEN_OWNERSHIP_ATTESTATION);

    assert!(ledger
        .mint(user(), &collection(), &ZkProof::with_input(input), &fixture.chain)
        .is_ok());
}

#[test]
fn test_wrong_input_length_rejected() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let mut input = balance_input(&collection(), Network::Goerli, 123, attestor());
    input.push(FieldElement::ZERO);

    assert!(matches!(
        ledger.mint(user(), &collection(), &ZkProof::with_input(input), &fixture.chain),
        Err(SealCredError::InvalidPublicInput(_))
    ));
}

#[test]
fn test_unknown_origin_metadata() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let unknown = EthAddress::from_bytes([0xcc; 20]);

    assert!(matches!(
        ledger.mint(user(), &unknown, &balance_proof(&unknown, Network::Goerli, 1), &fixture.chain),
        Err(SealCredError::UnknownOriginMetadata(_))
    ));
}

#[test]
fn test_proof_checked_before_origin_metadata() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let unknown = EthAddress::from_bytes([0xcc; 20]);
    let proof = ZkProof::with_input(balance_input(&unknown, Network::Goerli, 1, invalid_attestor()));

    assert_eq!(
        ledger.mint(user(), &unknown, &proof, &fixture.chain),
        Err(SealCredError::WrongAttestor)
    );
    assert_eq!(fixture.verifier.calls(), 0);
    assert_eq!(ledger.nonce(), 1);
}

#[test]
fn test_mint_proof_decodes_origin() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();

    let receipt = ledger
        .mint_proof(user(), &balance_proof(&other_collection(), Network::Goerli, 5), None, &fixture.chain)
        .unwrap();
    assert_eq!(ledger.get_derivative(&other_collection()), Some(receipt.derivative));
}

#[test]
fn test_token_uri() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let receipt = ledger
        .mint(user(), &collection(), &balance_proof(&collection(), Network::Goerli, 123), &fixture.chain)
        .unwrap();

    let derivative = ledger.derivative(&receipt.derivative).unwrap();
    assert_eq!(
        derivative.token_uri(0).unwrap(),
        format!("{}/{}/0", METADATA_URL, receipt.derivative.to_hex())
    );
    assert_eq!(derivative.token_uri(1), Err(SealCredError::NonexistentToken(1)));
}

#[test]
fn test_token_uri_keeps_base_uri_case() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let receipt = ledger
        .mint(user(), &collection(), &balance_proof(&collection(), Network::Goerli, 123), &fixture.chain)
        .unwrap();

    ledger
        .set_derivative_base_uri(&owner(), &receipt.derivative, "https://ipfs.io/ipfs/QmXyZAbC")
        .unwrap();
    assert_eq!(
        ledger.derivative(&receipt.derivative).unwrap().token_uri(0).unwrap(),
        format!("https://ipfs.io/ipfs/QmXyZAbC/{}/0", receipt.derivative.to_hex())
    );
}

#[test]
fn test_tokens_are_soulbound() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let receipt = ledger
        .mint(user(), &collection(), &balance_proof(&collection(), Network::Goerli, 123), &fixture.chain)
        .unwrap();

    let derivative = ledger.derivative_mut(&receipt.derivative).unwrap();
    for caller in [user(), owner(), ledger_address()] {
        assert_eq!(
            derivative.transfer_from(caller, owner(), 0),
            Err(SealCredError::SoulboundToken)
        );
        assert_eq!(
            derivative.safe_transfer_from(caller, owner(), 0),
            Err(SealCredError::SoulboundToken)
        );
    }
    assert_eq!(derivative.approve(owner(), 0), Err(SealCredError::SoulboundToken));
    assert_eq!(
        derivative.set_approval_for_all(owner(), true),
        Err(SealCredError::SoulboundToken)
    );
    assert_eq!(derivative.owner_of(0).unwrap(), user());
}

#[test]
fn test_owner_only_calls() {
    let mut ledger = erc721_ledger();

    assert_eq!(
        ledger.set_verifier_contract(&user(), EthAddress::zero()),
        Err(SealCredError::NotOwner)
    );
    assert_eq!(ledger.set_base_uri(&user(), NEW_METADATA_URL), Err(SealCredError::NotOwner));
    assert_eq!(ledger.delete_original(&user(), &collection()), Err(SealCredError::NotOwner));
    assert_eq!(ledger.transfer_ownership(&user(), user()), Err(SealCredError::NotOwner));
    assert_eq!(ledger.owner(), owner());

    ledger.set_verifier_contract(&owner(), user()).unwrap();
    assert_eq!(ledger.verifier_contract(), user());

    ledger.transfer_ownership(&owner(), user()).unwrap();
    assert_eq!(ledger.owner(), user());
    assert_eq!(
        ledger.set_base_uri(&owner(), NEW_METADATA_URL),
        Err(SealCredError::NotOwner)
    );
    assert!(matches!(
        ledger.transfer_ownership(&user(), EthAddress::zero()),
        Err(SealCredError::InvalidAddress(_))
    ));
}

#[test]
fn test_delete_original_keeps_derivative_state() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let proof = balance_proof(&collection(), Network::Goerli, 123);
    let first = ledger.mint(user(), &collection(), &proof, &fixture.chain).unwrap();

    ledger.delete_original(&owner(), &collection()).unwrap();
    assert_eq!(ledger.get_derivative(&collection()), None);
    assert_eq!(ledger.balance_of(&collection(), &user()), 0);

    let old = ledger.derivative(&first.derivative).unwrap();
    assert_eq!(old.balance_of(&user()), 1);
    assert!(old.is_nullifier_used(&FieldElement::from_u64(123)));

    // Nullifiers are scoped per derivative, so the fresh one accepts it.
    let second = ledger.mint(user(), &collection(), &proof, &fixture.chain).unwrap();
    assert!(second.created);
    assert_eq!(second.derivative, create_address(&ledger_address(), 2));
    assert_eq!(second.token_id, 0);
    assert_eq!(ledger.deployed().count(), 2);
    assert!(ledger
        .events()
        .contains(&LedgerEvent::DeleteOriginal { original: collection().to_string() }));
}

#[test]
fn test_verifier_rotation_only_affects_new_derivatives() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    ledger
        .mint(user(), &collection(), &balance_proof(&collection(), Network::Goerli, 1), &fixture.chain)
        .unwrap();

    let undeployed = EthAddress::from_bytes([0x77; 20]);
    ledger.set_verifier_contract(&owner(), undeployed).unwrap();

    assert!(ledger
        .mint(user(), &collection(), &balance_proof(&collection(), Network::Goerli, 2), &fixture.chain)
        .is_ok());
    assert!(matches!(
        ledger.mint(
            user(),
            &other_collection(),
            &balance_proof(&other_collection(), Network::Goerli, 3),
            &fixture.chain
        ),
        Err(SealCredError::UnknownVerifier(_))
    ));
}

#[test]
fn test_base_uri_changes() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let first = ledger
        .mint(user(), &collection(), &balance_proof(&collection(), Network::Goerli, 1), &fixture.chain)
        .unwrap();

    ledger.set_base_uri(&owner(), NEW_METADATA_URL).unwrap();
    let second = ledger
        .mint(
            user(),
            &other_collection(),
            &balance_proof(&other_collection(), Network::Goerli, 2),
            &fixture.chain,
        )
        .unwrap();

    assert_eq!(ledger.derivative(&first.derivative).unwrap().base_uri(), METADATA_URL);
    assert_eq!(
        ledger.derivative(&second.derivative).unwrap().base_uri(),
        NEW_METADATA_URL
    );

    assert_eq!(
        ledger.set_derivative_base_uri(&user(), &first.derivative, NEW_METADATA_URL),
        Err(SealCredError::NotOwner)
    );
    ledger
        .set_derivative_base_uri(&owner(), &first.derivative, NEW_METADATA_URL)
        .unwrap();
    assert_eq!(
        ledger.derivative(&first.derivative).unwrap().token_uri(0).unwrap(),
        format!("{}/{}/0", NEW_METADATA_URL, first.derivative.to_hex())
    );
}

#[test]
fn test_rejected_mints_are_idempotent() {
    let fixture = Fixture::new(false);
    let mut ledger = erc721_ledger();
    let proof = balance_proof(&collection(), Network::Goerli, 123);

    for _ in 0..2 {
        assert_eq!(
            ledger.mint(user(), &collection(), &proof, &fixture.chain),
            Err(SealCredError::InvalidProof)
        );
    }
    assert_eq!(fixture.verifier.calls(), 2);
    assert_eq!(ledger.deployed().count(), 0);
}

#[test]
fn test_seal_hub_commitment() {
    let seal_hub = EthAddress::from_bytes([0x5e; 20]);
    let mut fixture = Fixture::new(true);
    fixture.chain.add_seal_hub_root(seal_hub, FieldElement::from_u64(0));

    let mut ledger_params = params(Some(Network::Goerli));
    ledger_params.seal_hub = Some(seal_hub);
    let mut ledger = Ledger::<Erc721Family>::new(ledger_address(), owner(), ledger_params).unwrap();

    let mut input = balance_input(&collection(), Network::Goerli, 1, attestor());
    input[5] = FieldElement::from_u64(42);
    assert_eq!(
        ledger.mint(user(), &collection(), &ZkProof::with_input(input), &fixture.chain),
        Err(SealCredError::InvalidSealHubCommitment)
    );

    assert!(ledger
        .mint(user(), &collection(), &balance_proof(&collection(), Network::Goerli, 1), &fixture.chain)
        .is_ok());
}

#[test]
fn test_ledger_requires_family_configuration() {
    assert!(matches!(
        Ledger::<Erc721Family>::new(ledger_address(), owner(), params(None)),
        Err(SealCredError::Config(_))
    ));
    assert!(matches!(
        Ledger::<ExternalErc721Family>::new(ledger_address(), owner(), params(Some(Network::Mainnet))),
        Err(SealCredError::Config(_))
    ));
    assert!(Ledger::<EmailFamily>::new(ledger_address(), owner(), params(None)).is_ok());
}

#[test]
fn test_derivative_requires_name_and_symbol() {
    let base = DerivativeParams::<Erc721Family> {
        address: EthAddress::from_bytes([0x33; 20]),
        owner: owner(),
        ledger: ledger_address(),
        original: collection(),
        verifier_contract: verifier_address(),
        attestor_public_key: attestor(),
        network: Some(Network::Goerli),
        attestor_ecdsa_address: None,
        seal_hub: None,
        name: String::new(),
        symbol: "FAKE-d".into(),
        base_uri: METADATA_URL.into(),
        version: "0.0.1".into(),
    };
    assert_eq!(
        Derivative::new(base.clone()).err(),
        Some(SealCredError::ZeroNameLength)
    );

    let mut no_symbol = base;
    no_symbol.name = "Fake".into();
    no_symbol.symbol = String::new();
    assert_eq!(Derivative::new(no_symbol).err(), Some(SealCredError::ZeroSymbolLength));
}

#[test]
fn test_direct_derivative_mint_and_owner() {
    let fixture = Fixture::new(true);
    let mut derivative = Derivative::<Erc721Family>::new(DerivativeParams {
        address: EthAddress::from_bytes([0x33; 20]),
        owner: owner(),
        ledger: ledger_address(),
        original: collection(),
        verifier_contract: verifier_address(),
        attestor_public_key: attestor(),
        network: Some(Network::Goerli),
        attestor_ecdsa_address: None,
        seal_hub: None,
        name: "Fake ERC721 (derivative)".into(),
        symbol: "FAKE-d".into(),
        base_uri: METADATA_URL.into(),
        version: "0.0.1".into(),
    })
    .unwrap();

    let receipt = derivative
        .mint(user(), &balance_proof(&collection(), Network::Goerli, 9), &fixture.chain)
        .unwrap();
    assert_eq!(receipt.token_id, 0);
    assert!(!receipt.created);
    assert_eq!(
        derivative.events(),
        &[LedgerEvent::Mint {
            derivative: EthAddress::from_bytes([0x33; 20]),
            to: user(),
            token_id: 0,
        }]
    );
    assert_eq!(
        derivative.mint(user(), &balance_proof(&collection(), Network::Goerli, 9), &fixture.chain),
        Err(SealCredError::ProofAlreadyUsed)
    );
    assert_eq!(derivative.events().len(), 1);

    assert_eq!(derivative.set_base_uri(&user(), NEW_METADATA_URL), Err(SealCredError::NotOwner));
    derivative.set_base_uri(&owner(), NEW_METADATA_URL).unwrap();
    assert!(derivative.token_uri(0).unwrap().starts_with(NEW_METADATA_URL));

    derivative.transfer_ownership(&owner(), user()).unwrap();
    assert_eq!(derivative.owner(), user());
    assert_eq!(
        derivative.events().last(),
        Some(&LedgerEvent::OwnershipTransferred {
            previous_owner: owner(),
            new_owner: user(),
        })
    );
}

#[test]
fn test_derivative_requires_family_configuration() {
    let base = DerivativeParams::<Erc721Family> {
        address: EthAddress::from_bytes([0x33; 20]),
        owner: owner(),
        ledger: ledger_address(),
        original: collection(),
        verifier_contract: verifier_address(),
        attestor_public_key: attestor(),
        network: None,
        attestor_ecdsa_address: None,
        seal_hub: None,
        name: "Fake ERC721 (derivative)".into(),
        symbol: "FAKE-d".into(),
        base_uri: METADATA_URL.into(),
        version: "0.0.1".into(),
    };
    assert!(matches!(
        Derivative::new(base.clone()),
        Err(SealCredError::Config(_))
    ));

    let external = DerivativeParams::<ExternalErc721Family> {
        address: base.address,
        owner: base.owner,
        ledger: base.ledger,
        original: base.original,
        verifier_contract: base.verifier_contract,
        attestor_public_key: base.attestor_public_key,
        network: Some(Network::Mainnet),
        attestor_ecdsa_address: None,
        seal_hub: None,
        name: base.name.clone(),
        symbol: base.symbol.clone(),
        base_uri: base.base_uri.clone(),
        version: base.version.clone(),
    };
    assert!(matches!(
        Derivative::new(external.clone()),
        Err(SealCredError::Config(_))
    ));

    let mut with_attestor = external;
    with_attestor.attestor_ecdsa_address = Some(EthAddress::from_bytes([0x55; 20]));
    assert!(Derivative::new(with_attestor).is_ok());

    let email = DerivativeParams::<EmailFamily> {
        address: base.address,
        owner: base.owner,
        ledger: base.ledger,
        original: "sealcred.xyz".to_string(),
        verifier_contract: base.verifier_contract,
        attestor_public_key: base.attestor_public_key,
        network: None,
        attestor_ecdsa_address: None,
        seal_hub: None,
        name: base.name,
        symbol: base.symbol,
        base_uri: base.base_uri,
        version: base.version,
    };
    assert!(Derivative::new(email).is_ok());
}

#[test]
fn test_email_ledger() {
    let fixture = Fixture::new(true);
    let mut ledger = Ledger::<EmailFamily>::new(ledger_address(), owner(), params(None)).unwrap();
    let domain = "example.com".to_string();

    let receipt = ledger
        .mint(user(), &domain, &email_proof("example.com", 1), &fixture.chain)
        .unwrap();
    let derivative = ledger.derivative(&receipt.derivative).unwrap();
    assert_eq!(derivative.name(), "@example.com email");
    assert_eq!(derivative.symbol(), "example.com-d");
    assert_eq!(ledger.balance_of(&domain, &user()), 1);

    assert_eq!(
        ledger.mint(user(), &domain, &email_proof("example2.com", 2), &fixture.chain),
        Err(SealCredError::WrongEmail)
    );
    assert_eq!(
        ledger.mint(user(), &domain, &email_proof("example.com", 1), &fixture.chain),
        Err(SealCredError::ProofAlreadyUsed)
    );
}

#[test]
fn test_email_domain_prefix_is_not_a_match() {
    let fixture = Fixture::new(true);
    let mut ledger = Ledger::<EmailFamily>::new(ledger_address(), owner(), params(None)).unwrap();
    assert_eq!(
        ledger.mint(
            user(),
            &"example.com".to_string(),
            &email_proof("example.co", 1),
            &fixture.chain
        ),
        Err(SealCredError::WrongEmail)
    );
}

#[test]
fn test_farcaster_ledger() {
    let fixture = Fixture::new(true);
    let mut ledger = Ledger::<FarcasterFamily>::new(ledger_address(), owner(), params(None)).unwrap();

    let receipt = ledger
        .mint_proof(user(), &farcaster_proof(123, 0, "farcaster"), None, &fixture.chain)
        .unwrap();
    let derivative = ledger.derivative(&receipt.derivative).unwrap();
    assert_eq!(derivative.name(), "@farcaster");
    assert_eq!(derivative.symbol(), "farcaster-d");
    assert_eq!(ledger.balance_of(&FarcasterFamily::identity(), &user()), 1);

    assert_eq!(
        ledger.mint(
            user(),
            &FarcasterFamily::identity(),
            &farcaster_proof(124, 1, "farcaster"),
            &fixture.chain
        ),
        Err(SealCredError::InvalidAttestationType(1))
    );
    assert_eq!(
        ledger.mint(
            user(),
            &FarcasterFamily::identity(),
            &farcaster_proof(124, 0, "farcastor"),
            &fixture.chain
        ),
        Err(SealCredError::WrongAttestationSource)
    );
}

mod external {
    use super::*;
    use sealcred_types::Secp256k1PrivateKey;

    const ECDSA_KEY: &str = "c22d0fdda8dd97029978419bc67b2daf7a8827c507506d1a997ac52bd56e97b8";

    fn ecdsa_key() -> Secp256k1PrivateKey {
        Secp256k1PrivateKey::from_hex(ECDSA_KEY).unwrap()
    }

    fn ledger() -> Ledger<ExternalErc721Family> {
        let mut ledger_params = params(Some(Network::Mainnet));
        ledger_params.attestor_ecdsa_address =
            Some(eth_address(&ecdsa_key()).unwrap());
        Ledger::new(ledger_address(), owner(), ledger_params).unwrap()
    }

    fn attestation(origin: EthAddress, network: Network, name: &str, symbol: &str) -> EcdsaAttestation {
        EcdsaAttestation::sign(&AttestationMessage::new(origin, network, name, symbol), &ecdsa_key())
            .unwrap()
    }

    fn proof(nullifier: u64) -> ZkProof {
        balance_proof(&collection(), Network::Mainnet, nullifier)
    }

    #[test]
    fn test_mint_with_attestation() {
        let fixture = Fixture::new(true);
        let mut ledger = ledger();
        let attestation = attestation(collection(), Network::Mainnet, "Remote", "RMT");

        let receipt = ledger
            .mint_with_attestation(user(), &collection(), &proof(1), &attestation, &fixture.chain)
            .unwrap();
        let derivative = ledger.derivative(&receipt.derivative).unwrap();
        assert_eq!(derivative.name(), "Remote");
        assert_eq!(derivative.symbol(), "RMT");

        // Legacy (v, r, s) signatures are accepted too.
        let legacy = EcdsaAttestation {
            message: attestation.message.clone(),
            signature: sealcred_types::SignatureParts::Legacy(attestation.signature.to_legacy()),
        };
        assert!(ledger
            .mint_with_attestation(user(), &collection(), &proof(2), &legacy, &fixture.chain)
            .is_ok());
    }

    #[test]
    fn test_mint_requires_attestation() {
        let fixture = Fixture::new(true);
        let mut ledger = ledger();
        assert_eq!(
            ledger.mint(user(), &collection(), &proof(1), &fixture.chain),
            Err(SealCredError::EcdsaAttestationRequired)
        );
    }

    #[test]
    fn test_attestation_failures() {
        let fixture = Fixture::new(true);
        let mut ledger = ledger();

        let wrong_signer = EcdsaAttestation::sign(
            &AttestationMessage::new(collection(), Network::Mainnet, "Remote", "RMT"),
            &random_private_key(),
        )
        .unwrap();
        assert_eq!(
            ledger.mint_with_attestation(user(), &collection(), &proof(1), &wrong_signer, &fixture.chain),
            Err(SealCredError::WrongEcdsaAttestor)
        );

        let wrong_origin = attestation(EthAddress::zero(), Network::Mainnet, "Remote", "RMT");
        assert_eq!(
            ledger.mint_with_attestation(user(), &collection(), &proof(1), &wrong_origin, &fixture.chain),
            Err(SealCredError::WrongTokenAddress)
        );

        let wrong_network = attestation(collection(), Network::Goerli, "Remote", "RMT");
        assert_eq!(
            ledger.mint_with_attestation(user(), &collection(), &proof(1), &wrong_network, &fixture.chain),
            Err(SealCredError::WrongNetwork)
        );

        let valid = attestation(collection(), Network::Mainnet, "Remote", "RMT");
        let corrupted = EcdsaAttestation {
            message: valid.message.clone(),
            signature: sealcred_types::SignatureParts::Legacy(sealcred_types::EcdsaSignature::new(
                [0u8; 32], [0u8; 32], 27,
            )),
        };
        assert!(matches!(
            ledger.mint_with_attestation(user(), &collection(), &proof(1), &corrupted, &fixture.chain),
            Err(SealCredError::EcdsaVerificationError(_))
        ));

        assert_eq!(ledger.deployed().count(), 0);
        assert!(ledger
            .mint_with_attestation(user(), &collection(), &proof(1), &valid, &fixture.chain)
            .is_ok());
    }

    #[test]
    fn test_empty_name_or_symbol() {
        let fixture = Fixture::new(true);
        let mut ledger = ledger();
        assert_eq!(
            ledger.mint_with_attestation(
                user(),
                &collection(),
                &proof(1),
                &attestation(collection(), Network::Mainnet, "", "RMT"),
                &fixture.chain
            ),
            Err(SealCredError::ZeroNameLength)
        );
        assert_eq!(
            ledger.mint_with_attestation(
                user(),
                &collection(),
                &proof(1),
                &attestation(collection(), Network::Mainnet, "Remote", ""),
                &fixture.chain
            ),
            Err(SealCredError::ZeroSymbolLength)
        );
        assert_eq!(ledger.deployed().count(), 0);

        let receipt = ledger
            .mint_with_attestation(
                user(),
                &collection(),
                &proof(1),
                &attestation(collection(), Network::Mainnet, "Remote", "RMT"),
                &fixture.chain,
            )
            .unwrap();
        assert_eq!(
            ledger.mint_with_attestation(
                user(),
                &collection(),
                &proof(2),
                &attestation(collection(), Network::Mainnet, "", "RMT"),
                &fixture.chain
            ),
            Err(SealCredError::ZeroNameLength)
        );
        assert_eq!(ledger.derivative(&receipt.derivative).unwrap().total_supply(), 1);
    }

    #[test]
    fn test_invalid_proof_before_signature() {
        let fixture = Fixture::new(false);
        let mut ledger = ledger();
        let wrong_signer = EcdsaAttestation::sign(
            &AttestationMessage::new(collection(), Network::Mainnet, "Remote", "RMT"),
            &random_private_key(),
        )
        .unwrap();
        assert_eq!(
            ledger.mint_with_attestation(user(), &collection(), &proof(1), &wrong_signer, &fixture.chain),
            Err(SealCredError::InvalidProof)
        );
    }
}

#[test]
fn test_ledger_snapshot_roundtrip() {
    let fixture = Fixture::new(true);
    let mut ledger = erc721_ledger();
    let receipt = ledger
        .mint(user(), &collection(), &balance_proof(&collection(), Network::Goerli, 123), &fixture.chain)
        .unwrap();

    let bytes = bincode::serialize(&ledger).unwrap();
    let mut restored: Ledger<Erc721Family> = bincode::deserialize(&bytes).unwrap();

    assert_eq!(restored.get_derivative(&collection()), Some(receipt.derivative));
    assert_eq!(restored.balance_of(&collection(), &user()), 1);
    assert_eq!(restored.events(), ledger.events());
    assert_eq!(
        restored.mint(
            user(),
            &collection(),
            &balance_proof(&collection(), Network::Goerli, 123),
            &fixture.chain
        ),
        Err(SealCredError::ProofAlreadyUsed)
    );
}

mod groth16 {
    use super::*;
    use ark_bn254::{Bn254, Fr};
    use ark_groth16::Groth16;
    use ark_r1cs_std::{alloc::AllocVar, eq::EqGadget, fields::fp::FpVar};
    use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
    use ark_snark::SNARK;
    use ark_std::rand::thread_rng;
    use sealcred_crypto::{encode_proof, fr_from_element, Groth16Verifier};

    /// Eight public inputs in balance layout; the nullifier must be the
    /// square of a private secret.
    #[derive(Clone)]
    struct BalanceCircuit {
        inputs: Vec<Fr>,
        secret: Fr,
    }

    impl ConstraintSynthesizer<Fr> for BalanceCircuit {
        fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
            let mut vars = Vec::with_capacity(self.inputs.len());
            for value in &self.inputs {
                vars.push(FpVar::new_input(cs.clone(), || Ok(*value))?);
            }
            let secret = FpVar::new_witness(cs, || Ok(self.secret))?;
            let square = secret.clone() * &secret;
            square.enforce_equal(&vars[6])?;
            Ok(())
        }
    }

    #[test]
    fn test_mint_with_real_groth16_verifier() {
        let mut rng = thread_rng();
        let secret = Fr::from(11u64);
        let input = balance_input(&collection(), Network::Goerli, 121, attestor());
        let inputs: Vec<Fr> = input.iter().map(|e| fr_from_element(e).unwrap()).collect();

        let circuit = BalanceCircuit {
            inputs: inputs.clone(),
            secret,
        };
        let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit.clone(), &mut rng).unwrap();
        let ark_proof = Groth16::<Bn254>::prove(&pk, circuit, &mut rng).unwrap();
        let proof = encode_proof(&ark_proof, &inputs);

        let mut chain = MemoryChain::new();
        chain.add_verifier(verifier_address(), Arc::new(Groth16Verifier::new(vk)));
        chain.add_collection(collection(), "Fake ERC721", "FAKE");

        let mut ledger = erc721_ledger();

        let mut tampered = proof.clone();
        tampered.input[4] = FieldElement::from_u64(1000);
        assert_eq!(
            ledger.mint(user(), &collection(), &tampered, &chain),
            Err(SealCredError::InvalidProof)
        );

        let receipt = ledger.mint(user(), &collection(), &proof, &chain).unwrap();
        assert_eq!(receipt.nullifier, FieldElement::from_u64(121));
        assert_eq!(ledger.balance_of(&collection(), &user()), 1);
    }
}

#[derive(Clone, Copy, Debug)]
struct Faults {
    wrong_type: bool,
    wrong_origin: bool,
    wrong_network: bool,
    wrong_attestor: bool,
    replay: bool,
    rejected: bool,
}

impl Faults {
    fn expected(&self) -> Option<SealCredError> {
        if self.wrong_type {
            Some(SealCredError::InvalidAttestationType(7))
        } else if self.wrong_origin {
            Some(SealCredError::WrongTokenAddress)
        } else if self.wrong_network {
            Some(SealCredError::WrongNetwork)
        } else if self.wrong_attestor {
            Some(SealCredError::WrongAttestor)
        } else if self.replay {
            Some(SealCredError::ProofAlreadyUsed)
        } else if self.rejected {
            Some(SealCredError::InvalidProof)
        } else {
            None
        }
    }

    fn proof(&self) -> ZkProof {
        let origin = if self.wrong_origin { other_collection() } else { collection() };
        let network = if self.wrong_network { Network::Mainnet } else { Network::Goerli };
        let key = if self.wrong_attestor { invalid_attestor() } else { attestor() };
        let nullifier = if self.replay { 1 } else { 2 };
        let mut input = balance_input(&origin, network, nullifier, key);
        if self.wrong_type {
            input[0] = FieldElement::from_u64(7);
        }
        ZkProof::with_input(input)
    }
}

fn faults() -> impl Strategy<Value = Faults> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(wrong_type, wrong_origin, wrong_network, wrong_attestor, replay, rejected)| Faults {
            wrong_type,
            wrong_origin,
            wrong_network,
            wrong_attestor,
            replay,
            rejected,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_check_order_is_path_independent(case in faults()) {
        let mut fixture = Fixture::new(true);
        let seed = balance_proof(&collection(), Network::Goerli, 1);

        let mut ledger = erc721_ledger();
        let deployed = ledger.mint(user(), &collection(), &seed, &fixture.chain).unwrap();

        let mut direct = Derivative::<Erc721Family>::new(DerivativeParams {
            address: EthAddress::from_bytes([0x44; 20]),
            owner: owner(),
            ledger: ledger_address(),
            original: collection(),
            verifier_contract: verifier_address(),
            attestor_public_key: attestor(),
            network: Some(Network::Goerli),
            attestor_ecdsa_address: None,
            seal_hub: None,
            name: "Fake ERC721 (derivative)".into(),
            symbol: "FAKE-d".into(),
            base_uri: METADATA_URL.into(),
            version: "0.0.1".into(),
        }).unwrap();
        direct.mint(user(), &seed, &fixture.chain).unwrap();

        fixture.set_verifier_result(!case.rejected);
        let proof = case.proof();

        let via_ledger = ledger.mint(owner(), &collection(), &proof, &fixture.chain);
        let via_derivative = direct.mint(owner(), &proof, &fixture.chain);

        match case.expected() {
            Some(expected) => {
                prop_assert_eq!(via_ledger.unwrap_err(), expected.clone());
                prop_assert_eq!(via_derivative.unwrap_err(), expected);
                prop_assert_eq!(ledger.balance_of(&collection(), &owner()), 0);
                prop_assert_eq!(direct.balance_of(&owner()), 0);
            }
            None => {
                prop_assert_eq!(via_ledger.unwrap().derivative, deployed.derivative);
                prop_assert_eq!(via_derivative.unwrap().token_id, 1);
            }
        }
    }

    #[test]
    fn prop_each_nullifier_mints_once(nullifiers in proptest::collection::vec(0u64..32, 1..24)) {
        let fixture = Fixture::new(true);
        let mut ledger = erc721_ledger();
        let mut seen = std::collections::HashSet::new();

        for nullifier in nullifiers {
            let result = ledger.mint(
                user(),
                &collection(),
                &balance_proof(&collection(), Network::Goerli, nullifier),
                &fixture.chain,
            );
            if seen.insert(nullifier) {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result, Err(SealCredError::ProofAlreadyUsed));
            }
        }
        prop_assert_eq!(ledger.balance_of(&collection(), &user()), seen.len() as u64);
    }

    #[test]
    fn prop_wrong_attestor_always_rejected(key in proptest::array::uniform32(any::<u8>()), verifies in any::<bool>()) {
        let key = FieldElement(key);
        prop_assume!(key != attestor());
        let fixture = Fixture::new(verifies);
        let mut ledger = erc721_ledger();
        let proof = ZkProof::with_input(balance_input(&collection(), Network::Goerli, 1, key));
        prop_assert_eq!(
            ledger.mint(user(), &collection(), &proof, &fixture.chain),
            Err(SealCredError::WrongAttestor)
        );
    }
}
