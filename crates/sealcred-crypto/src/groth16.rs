//! Groth16 verification over BN254 for proofs in EVM calldata layout.
//!
//! A verifier contract is modelled by [`ProofVerifier`]: a deterministic,
//! side-effect free `verifyProof(a, b, c, input) -> bool`.

use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::{BigInt, BigInteger, PrimeField};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use sealcred_types::{FieldElement, SealCredError, SealCredResult, ZkProof};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

pub trait ProofVerifier: Send + Sync {
    /// Number of public inputs the circuit expects, when known.
    fn input_len(&self) -> Option<usize> {
        None
    }

    /// `Ok(false)` for any proof the pairing check does not accept, including
    /// points off the curve and inputs outside the scalar field.
    fn verify_proof(&self, proof: &ZkProof) -> SealCredResult<bool>;
}

fn limbs_from_be(element: &FieldElement) -> BigInt<4> {
    let bytes = element.to_be_bytes();
    let mut limbs = [0u64; 4];
    for (i, limb) in limbs.iter_mut().enumerate() {
        let start = 32 - 8 * (i + 1);
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[start..start + 8]);
        *limb = u64::from_be_bytes(word);
    }
    BigInt::new(limbs)
}

fn be_from_bigint<B: BigInteger>(value: B) -> FieldElement {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    FieldElement::from_be_bytes(out)
}

/// Canonical base-field element, `None` when `>= q`.
pub fn fq_from_element(element: &FieldElement) -> Option<Fq> {
    Fq::from_bigint(limbs_from_be(element))
}

/// Canonical scalar, `None` when `>= r`.
pub fn fr_from_element(element: &FieldElement) -> Option<Fr> {
    Fr::from_bigint(limbs_from_be(element))
}

pub fn fq_to_element(value: &Fq) -> FieldElement {
    be_from_bigint(value.into_bigint())
}

pub fn fr_to_element(value: &Fr) -> FieldElement {
    be_from_bigint(value.into_bigint())
}

fn g1_from_elements(coords: &[FieldElement; 2]) -> Option<G1Affine> {
    if coords[0].is_zero() && coords[1].is_zero() {
        return Some(G1Affine::zero());
    }
    let point = G1Affine::new_unchecked(fq_from_element(&coords[0])?, fq_from_element(&coords[1])?);
    (point.is_on_curve() && point.is_in_correct_subgroup_assuming_on_curve()).then_some(point)
}

fn g2_from_elements(coords: &[[FieldElement; 2]; 2]) -> Option<G2Affine> {
    if coords.iter().flatten().all(|c| c.is_zero()) {
        return Some(G2Affine::zero());
    }
    let x = Fq2::new(fq_from_element(&coords[0][1])?, fq_from_element(&coords[0][0])?);
    let y = Fq2::new(fq_from_element(&coords[1][1])?, fq_from_element(&coords[1][0])?);
    let point = G2Affine::new_unchecked(x, y);
    (point.is_on_curve() && point.is_in_correct_subgroup_assuming_on_curve()).then_some(point)
}

fn g1_to_elements(point: &G1Affine) -> [FieldElement; 2] {
    match point.xy() {
        Some((x, y)) => [fq_to_element(x), fq_to_element(y)],
        None => [FieldElement::ZERO, FieldElement::ZERO],
    }
}

fn g2_to_elements(point: &G2Affine) -> [[FieldElement; 2]; 2] {
    match point.xy() {
        Some((x, y)) => [
            [fq_to_element(&x.c1), fq_to_element(&x.c0)],
            [fq_to_element(&y.c1), fq_to_element(&y.c0)],
        ],
        None => [[FieldElement::ZERO; 2]; 2],
    }
}

/// Converts an arkworks proof and its public inputs to calldata layout.
pub fn encode_proof(proof: &Proof<Bn254>, public_inputs: &[Fr]) -> ZkProof {
    ZkProof {
        a: g1_to_elements(&proof.a),
        b: g2_to_elements(&proof.b),
        c: g1_to_elements(&proof.c),
        input: public_inputs.iter().map(fr_to_element).collect(),
    }
}

/// Parses calldata layout back into curve points. `None` if any coordinate is
/// non-canonical or a point is not in its prime-order subgroup.
pub fn decode_proof(proof: &ZkProof) -> Option<Proof<Bn254>> {
    Some(Proof {
        a: g1_from_elements(&proof.a)?,
        b: g2_from_elements(&proof.b)?,
        c: g1_from_elements(&proof.c)?,
    })
}

/// Pairing-check verifier for one circuit's verifying key.
pub struct Groth16Verifier {
    pvk: PreparedVerifyingKey<Bn254>,
    input_len: usize,
}

impl Groth16Verifier {
    pub fn new(vk: VerifyingKey<Bn254>) -> Self {
        let input_len = vk.gamma_abc_g1.len().saturating_sub(1);
        Self {
            pvk: ark_groth16::prepare_verifying_key(&vk),
            input_len,
        }
    }

    /// Loads a compressed, canonically serialized verifying key.
    pub fn from_bytes(bytes: &[u8]) -> SealCredResult<Self> {
        let vk = VerifyingKey::<Bn254>::deserialize_compressed(bytes)
            .map_err(|e| SealCredError::Crypto(format!("Invalid verifying key: {}", e)))?;
        Ok(Self::new(vk))
    }

    pub fn from_file(path: &Path) -> SealCredResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            SealCredError::Config(format!("Cannot read verifying key {}: {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn verifying_key_bytes(vk: &VerifyingKey<Bn254>) -> SealCredResult<Vec<u8>> {
        let mut bytes = Vec::new();
        vk.serialize_compressed(&mut bytes)
            .map_err(|e| SealCredError::Serialization(e.to_string()))?;
        Ok(bytes)
    }
}

impl ProofVerifier for Groth16Verifier {
    fn input_len(&self) -> Option<usize> {
        Some(self.input_len)
    }

    fn verify_proof(&self, proof: &ZkProof) -> SealCredResult<bool> {
        if proof.input.len() != self.input_len {
            return Err(SealCredError::InvalidPublicInput(format!(
                "verifier expects {} inputs, got {}",
                self.input_len,
                proof.input.len()
            )));
        }

        let inputs: Option<Vec<Fr>> = proof.input.iter().map(fr_from_element).collect();
        let (Some(inputs), Some(ark_proof)) = (inputs, decode_proof(proof)) else {
            return Ok(false);
        };

        Groth16::<Bn254>::verify_with_processed_vk(&self.pvk, &inputs, &ark_proof)
            .map_err(|e| SealCredError::Crypto(e.to_string()))
    }
}

/// A verifier with a constant answer, for development networks.
///
/// Counts how often it was consulted.
#[derive(Debug, Default)]
pub struct FixedVerifier {
    result: bool,
    calls: AtomicU64,
}

impl FixedVerifier {
    pub fn new(result: bool) -> Self {
        Self {
            result,
            calls: AtomicU64::new(0),
        }
    }

    pub fn accepting() -> Self {
        Self::new(true)
    }

    pub fn rejecting() -> Self {
        Self::new(false)
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProofVerifier for FixedVerifier {
    fn verify_proof(&self, _proof: &ZkProof) -> SealCredResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result)
    }
}
