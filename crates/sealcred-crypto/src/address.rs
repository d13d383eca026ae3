use crate::keccak256;
use sealcred_types::EthAddress;

/// RLP encoding of an unsigned integer: minimal big-endian bytes with a
/// short-string prefix, `0x80` for zero.
fn rlp_encode_u64(value: u64, out: &mut Vec<u8>) {
    if value == 0 {
        out.push(0x80);
        return;
    }
    if value < 0x80 {
        out.push(value as u8);
        return;
    }
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    out.push(0x80 + (8 - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

/// Address of a contract created by `sender` with account nonce `nonce`:
/// `keccak256(rlp([sender, nonce]))[12..]`.
pub fn create_address(sender: &EthAddress, nonce: u64) -> EthAddress {
    let mut payload = Vec::with_capacity(30);
    payload.push(0x80 + 20);
    payload.extend_from_slice(sender.as_bytes());
    rlp_encode_u64(nonce, &mut payload);

    let mut encoded = Vec::with_capacity(payload.len() + 1);
    encoded.push(0xc0 + payload.len() as u8);
    encoded.extend_from_slice(&payload);

    let hash = keccak256(&encoded);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    EthAddress::from_bytes(address)
}
