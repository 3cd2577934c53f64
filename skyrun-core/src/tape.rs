//! Binary input tapes.
//!
//! Layout (little endian):
//!
//! ```text
//! 0   magic "SKRN"      u32
//! 4   version           u8
//! 5   character id      u8
//! 6   reserved          [u8; 2]  (zero)
//! 8   seed              u32
//! 12  frame_count       u32
//! 16  inputs            [u8; frame_count]  (bit 0 = jump)
//! ..  final_pickups     u32
//! ..  final_level       u32
//! ..  crc32             u32  over everything before the footer
//! ```

use serde::{Deserialize, Serialize};

use crate::error::TapeError;
use crate::sim::{Character, FrameInput};

pub const TAPE_MAGIC: u32 = u32::from_le_bytes(*b"SKRN");
pub const TAPE_VERSION: u8 = 1;
pub const TAPE_HEADER_SIZE: usize = 16;
pub const TAPE_FOOTER_SIZE: usize = 12;

const JUMP_BIT: u8 = 0x01;
const RESERVED_INPUT_BITS: u8 = !JUMP_BIT;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeHeader {
    pub magic: u32,
    pub version: u8,
    pub character: Character,
    pub seed: u32,
    pub frame_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeFooter {
    pub final_pickups: u32,
    pub final_level: u32,
    pub checksum: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TapeView<'a> {
    pub header: TapeHeader,
    pub inputs: &'a [u8],
    pub footer: TapeFooter,
}

impl TapeView<'_> {
    pub fn frame_inputs(&self) -> Vec<FrameInput> {
        self.inputs.iter().copied().map(decode_input_byte).collect()
    }
}

#[inline]
pub fn encode_input_byte(input: FrameInput) -> u8 {
    if input.jump {
        JUMP_BIT
    } else {
        0
    }
}

#[inline]
pub fn decode_input_byte(byte: u8) -> FrameInput {
    FrameInput {
        jump: (byte & JUMP_BIT) != 0,
    }
}

pub fn encode_inputs(inputs: &[FrameInput]) -> Vec<u8> {
    inputs.iter().copied().map(encode_input_byte).collect()
}

pub fn parse_tape(bytes: &[u8], max_frames: u32) -> Result<TapeView<'_>, TapeError> {
    let min_len = TAPE_HEADER_SIZE + TAPE_FOOTER_SIZE;
    if bytes.len() < min_len {
        return Err(TapeError::TapeTooShort {
            actual: bytes.len(),
            min: min_len,
        });
    }

    let magic = read_u32_le(bytes, 0);
    if magic != TAPE_MAGIC {
        return Err(TapeError::InvalidMagic { found: magic });
    }

    let version = bytes[4];
    if version != TAPE_VERSION {
        return Err(TapeError::UnsupportedVersion { found: version });
    }

    let character =
        Character::from_id(bytes[5]).ok_or(TapeError::UnknownCharacter { found: bytes[5] })?;
    if bytes[6] != 0 || bytes[7] != 0 {
        return Err(TapeError::HeaderReservedNonZero);
    }

    let seed = read_u32_le(bytes, 8);
    let frame_count = read_u32_le(bytes, 12);
    if frame_count == 0 || frame_count > max_frames {
        return Err(TapeError::FrameCountOutOfRange {
            frame_count,
            max_frames,
        });
    }

    let expected_len = TAPE_HEADER_SIZE + frame_count as usize + TAPE_FOOTER_SIZE;
    if bytes.len() != expected_len {
        return Err(TapeError::TapeLengthMismatch {
            expected: expected_len,
            actual: bytes.len(),
        });
    }

    let inputs_start = TAPE_HEADER_SIZE;
    let inputs_end = inputs_start + frame_count as usize;
    let inputs = &bytes[inputs_start..inputs_end];
    if let Some(frame) = inputs
        .iter()
        .position(|byte| byte & RESERVED_INPUT_BITS != 0)
    {
        return Err(TapeError::ReservedInputBitsNonZero {
            frame: frame as u32,
            byte: inputs[frame],
        });
    }

    let final_pickups = read_u32_le(bytes, inputs_end);
    let final_level = read_u32_le(bytes, inputs_end + 4);
    let checksum = read_u32_le(bytes, inputs_end + 8);

    let computed = crc32(&bytes[..inputs_end]);
    if checksum != computed {
        return Err(TapeError::CrcMismatch {
            stored: checksum,
            computed,
        });
    }

    Ok(TapeView {
        header: TapeHeader {
            magic,
            version,
            character,
            seed,
            frame_count,
        },
        inputs,
        footer: TapeFooter {
            final_pickups,
            final_level,
            checksum,
        },
    })
}

pub fn serialize_tape(
    seed: u32,
    character: Character,
    inputs: &[u8],
    final_pickups: u32,
    final_level: u32,
) -> Vec<u8> {
    let total_len = TAPE_HEADER_SIZE + inputs.len() + TAPE_FOOTER_SIZE;
    let mut data = vec![0u8; total_len];

    write_u32_le(&mut data, 0, TAPE_MAGIC);
    data[4] = TAPE_VERSION;
    data[5] = character.id();
    write_u32_le(&mut data, 8, seed);
    write_u32_le(&mut data, 12, inputs.len() as u32);

    let body_end = TAPE_HEADER_SIZE + inputs.len();
    data[TAPE_HEADER_SIZE..body_end].copy_from_slice(inputs);

    write_u32_le(&mut data, body_end, final_pickups);
    write_u32_le(&mut data, body_end + 4, final_level);

    let checksum = crc32(&data[..body_end]);
    write_u32_le(&mut data, body_end + 8, checksum);

    data
}

#[inline]
fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
fn write_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;

    while i < 256 {
        let mut c = i as u32;
        let mut j = 0;
        while j < 8 {
            c = if (c & 1) != 0 {
                0xEDB8_8320u32 ^ (c >> 1)
            } else {
                c >> 1
            };
            j += 1;
        }
        table[i] = c;
        i += 1;
    }

    table
}

/// CRC-32 (IEEE, reflected).
pub fn crc32(data: &[u8]) -> u32 {
    let crc = data.iter().fold(0xFFFF_FFFFu32, |crc, byte| {
        CRC_TABLE[((crc ^ *byte as u32) & 0xFF) as usize] ^ (crc >> 8)
    });
    crc ^ 0xFFFF_FFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tape() -> Vec<u8> {
        serialize_tape(0xABCD_1234, Character::Fairy, &[0x00, 0x01, 0x01], 9, 2)
    }

    fn rewrite_checksum(bytes: &mut [u8]) {
        let footer = bytes.len() - TAPE_FOOTER_SIZE;
        let checksum = crc32(&bytes[..footer]);
        write_u32_le(bytes, footer + 8, checksum);
    }

    #[test]
    fn crc_matches_known_vector() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn magic_reads_as_ascii() {
        let bytes = sample_tape();
        assert_eq!(&bytes[..4], b"SKRN");
    }

    #[test]
    fn parses_what_it_serializes() {
        let bytes = sample_tape();
        let tape = parse_tape(&bytes, 100).unwrap();

        assert_eq!(tape.header.seed, 0xABCD_1234);
        assert_eq!(tape.header.character, Character::Fairy);
        assert_eq!(tape.header.frame_count, 3);
        assert_eq!(tape.inputs, [0x00, 0x01, 0x01]);
        assert_eq!(
            tape.frame_inputs(),
            vec![
                FrameInput { jump: false },
                FrameInput { jump: true },
                FrameInput { jump: true },
            ]
        );
        assert_eq!(tape.footer.final_pickups, 9);
        assert_eq!(tape.footer.final_level, 2);
    }

    #[test]
    fn rejects_tape_too_short() {
        let bytes = [0u8; TAPE_HEADER_SIZE + TAPE_FOOTER_SIZE - 1];
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(TapeError::TapeTooShort { .. })
        ));
    }

    #[test]
    fn rejects_invalid_magic() {
        let mut bytes = sample_tape();
        bytes[0] = b'X';
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(TapeError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut bytes = sample_tape();
        bytes[4] = TAPE_VERSION + 1;
        assert_eq!(
            parse_tape(&bytes, 100),
            Err(TapeError::UnsupportedVersion {
                found: TAPE_VERSION + 1
            })
        );
    }

    #[test]
    fn rejects_unknown_character() {
        let mut bytes = sample_tape();
        bytes[5] = 7;
        rewrite_checksum(&mut bytes);
        assert_eq!(
            parse_tape(&bytes, 100),
            Err(TapeError::UnknownCharacter { found: 7 })
        );
    }

    #[test]
    fn rejects_nonzero_header_reserved_bytes() {
        let mut bytes = sample_tape();
        bytes[7] = 1;
        assert_eq!(
            parse_tape(&bytes, 100),
            Err(TapeError::HeaderReservedNonZero)
        );
    }

    #[test]
    fn rejects_frame_count_out_of_range() {
        let bytes = sample_tape();
        assert_eq!(
            parse_tape(&bytes, 2),
            Err(TapeError::FrameCountOutOfRange {
                frame_count: 3,
                max_frames: 2
            })
        );

        let mut empty = sample_tape();
        empty[12..16].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            parse_tape(&empty, 100),
            Err(TapeError::FrameCountOutOfRange { frame_count: 0, .. })
        ));
    }

    #[test]
    fn rejects_length_not_matching_frame_count() {
        let mut longer = sample_tape();
        longer.push(0);
        assert!(matches!(
            parse_tape(&longer, 100),
            Err(TapeError::TapeLengthMismatch { .. })
        ));

        let mut shorter = sample_tape();
        shorter.pop();
        assert!(matches!(
            parse_tape(&shorter, 100),
            Err(TapeError::TapeLengthMismatch { .. })
        ));
    }

    #[test]
    fn rejects_reserved_input_bits() {
        let mut bytes = sample_tape();
        bytes[TAPE_HEADER_SIZE + 2] = 0x03;
        rewrite_checksum(&mut bytes);
        assert_eq!(
            parse_tape(&bytes, 100),
            Err(TapeError::ReservedInputBitsNonZero {
                frame: 2,
                byte: 0x03
            })
        );
    }

    #[test]
    fn rejects_crc_mismatch() {
        let mut bytes = sample_tape();
        bytes[TAPE_HEADER_SIZE] ^= JUMP_BIT;
        assert!(matches!(
            parse_tape(&bytes, 100),
            Err(TapeError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn input_bytes_only_use_the_jump_bit() {
        assert_eq!(encode_input_byte(FrameInput { jump: true }), 0x01);
        assert_eq!(encode_input_byte(FrameInput { jump: false }), 0x00);
        assert_eq!(decode_input_byte(0x01), FrameInput { jump: true });
    }
}
