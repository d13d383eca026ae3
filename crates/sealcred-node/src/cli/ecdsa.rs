use super::commands::{AttestationArgs, EcdsaAction, OutputFormat};
use super::utils::{parse_hex_bytes, print_output};
use anyhow::Result;
use sealcred_crypto::eth_address;
use sealcred_ledger::{AttestationMessage, EcdsaAttestation};
use sealcred_types::{EthAddress, Secp256k1PrivateKey};
use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
struct SignedAttestation {
    message: String,
    signature: String,
    signer: EthAddress,
}

impl fmt::Display for SignedAttestation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Message:   {}", self.message)?;
        writeln!(f, "Signature: {}", self.signature)?;
        writeln!(f, "Signer:    {}", self.signer)
    }
}

#[derive(Serialize)]
struct RecoveredAttestation {
    signer: EthAddress,
    message: Option<AttestationMessage>,
}

impl fmt::Display for RecoveredAttestation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Signer: {}", self.signer)?;
        if let Some(message) = &self.message {
            writeln!(f, "Origin: {}", message.origin)?;
            writeln!(f, "Network: {}", char::from(message.network))?;
            writeln!(f, "Name: {}", message.name)?;
            writeln!(f, "Symbol: {}", message.symbol)?;
        }
        Ok(())
    }
}

fn message_from(args: &AttestationArgs) -> AttestationMessage {
    AttestationMessage::new(args.origin, args.network, &args.name, &args.symbol)
}

pub fn handle_ecdsa(action: EcdsaAction, format: &OutputFormat) -> Result<()> {
    match action {
        EcdsaAction::Message { attestation } => {
            let bytes = message_from(&attestation).to_bytes();
            println!("0x{}", hex::encode(bytes));
        }
        EcdsaAction::Sign { attestation, key } => {
            let key = Secp256k1PrivateKey::from_hex(&key)?;
            let signed = EcdsaAttestation::sign(&message_from(&attestation), &key)?;
            print_output(
                format,
                &SignedAttestation {
                    message: format!("0x{}", hex::encode(&signed.message)),
                    signature: format!("0x{}", hex::encode(signed.signature.to_vec())),
                    signer: eth_address(&key)?,
                },
            )?;
        }
        EcdsaAction::Recover { message, signature } => {
            let attestation =
                EcdsaAttestation::from_slices(&parse_hex_bytes(&message)?, &parse_hex_bytes(&signature)?)?;
            print_output(
                format,
                &RecoveredAttestation {
                    signer: attestation.recover_signer()?,
                    message: attestation.parsed().ok(),
                },
            )?;
        }
    }
    Ok(())
}
