//! secp256k1 keys, EIP-191 personal signatures and signer recovery.

use sealcred_types::{
    EcdsaSignature, EthAddress, SealCredError, SealCredResult, Secp256k1PrivateKey, SignatureParts,
    ETH_ADDRESS_SIZE,
};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};

thread_local! {
    static CONTEXT: Secp256k1<secp256k1::All> = Secp256k1::new();
}

/// Half the curve order. A larger `s` is the malleable twin of a valid
/// signature.
const HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

fn rejected(reason: impl std::fmt::Display) -> SealCredError {
    SealCredError::EcdsaVerificationError(reason.to_string())
}

fn secret_key(key: &Secp256k1PrivateKey) -> SealCredResult<SecretKey> {
    SecretKey::from_slice(key.as_bytes()).map_err(|e| SealCredError::InvalidKey(e.to_string()))
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// `keccak256("\x19Ethereum Signed Message:\n" || len || message)`.
pub fn eip191_hash(message: &[u8]) -> [u8; 32] {
    let mut digest = Keccak256::new();
    digest.update(b"\x19Ethereum Signed Message:\n");
    digest.update(message.len().to_string().as_bytes());
    digest.update(message);
    digest.finalize().into()
}

/// A fresh key from the thread RNG.
pub fn random_private_key() -> Secp256k1PrivateKey {
    let key = SecretKey::new(&mut rand::thread_rng());
    Secp256k1PrivateKey::from_bytes(key.secret_bytes())
}

fn address_of(public: &PublicKey) -> EthAddress {
    let point = public.serialize_uncompressed();
    let hash = keccak256(&point[1..]);
    let mut bytes = [0u8; ETH_ADDRESS_SIZE];
    bytes.copy_from_slice(&hash[32 - ETH_ADDRESS_SIZE..]);
    EthAddress::from_bytes(bytes)
}

/// The account controlled by `key`.
pub fn eth_address(key: &Secp256k1PrivateKey) -> SealCredResult<EthAddress> {
    let secret = secret_key(key)?;
    Ok(CONTEXT.with(|ctx| address_of(&PublicKey::from_secret_key(ctx, &secret))))
}

/// Signs `message` as `personal_sign` does. `v` is 27 or 28.
pub fn sign_personal(key: &Secp256k1PrivateKey, message: &[u8]) -> SealCredResult<EcdsaSignature> {
    let secret = secret_key(key)?;
    let digest = Message::from_digest(eip191_hash(message));
    let (recovery_id, compact) = CONTEXT
        .with(|ctx| ctx.sign_ecdsa_recoverable(&digest, &secret))
        .serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&compact[..32]);
    s.copy_from_slice(&compact[32..]);
    Ok(EcdsaSignature::new(r, s, 27 + recovery_id.to_i32() as u8))
}

/// Returns the recovery parity, rejecting zero scalars, high `s` and any
/// `v` outside `{0, 1, 27, 28}`.
pub fn recovery_parity(signature: &EcdsaSignature) -> SealCredResult<u8> {
    if signature.r == [0u8; 32] || signature.s == [0u8; 32] {
        return Err(rejected("zero signature component"));
    }
    if signature.s > HALF_ORDER {
        return Err(rejected("signature 's' above half order"));
    }
    match signature.v {
        0 | 1 => Ok(signature.v),
        27 | 28 => Ok(signature.v - 27),
        v => Err(rejected(format!("signature 'v' of {}", v))),
    }
}

/// Address whose key signed `digest`.
pub fn recover_signer(digest: &[u8; 32], signature: &SignatureParts) -> SealCredResult<EthAddress> {
    let legacy = signature.to_legacy();
    let parity = recovery_parity(&legacy)?;
    let recovery_id = RecoveryId::from_i32(parity as i32).map_err(rejected)?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&legacy.r);
    compact[32..].copy_from_slice(&legacy.s);
    let recoverable = RecoverableSignature::from_compact(&compact, recovery_id).map_err(rejected)?;

    let public = CONTEXT
        .with(|ctx| ctx.recover_ecdsa(&Message::from_digest(*digest), &recoverable))
        .map_err(rejected)?;
    Ok(address_of(&public))
}

/// Signer of an EIP-191 personal message.
pub fn recover_personal_signer(message: &[u8], signature: &SignatureParts) -> SealCredResult<EthAddress> {
    recover_signer(&eip191_hash(message), signature)
}

/// Constant-time address comparison.
pub fn addresses_match(a: &EthAddress, b: &EthAddress) -> bool {
    use subtle::ConstantTimeEq;
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
