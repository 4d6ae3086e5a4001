//! Minimal MAVLink parser for the telemetry the buzzer listens to.
//!
//! Handles MAVLink 1 and 2 framing and decodes HEARTBEAT, SYS_STATUS,
//! GPS_RAW_INT, EKF_STATUS_REPORT and STATUSTEXT. Other messages are
//! reported as [`MavMessage::Unknown`] without CRC validation, since their
//! CRC_EXTRA is not known here.

use crc::{Crc, CRC_16_MCRF4XX};

/// MAVLink 1 start byte.
pub const MAVLINK_STX_V1: u8 = 0xFE;

/// MAVLink 2 start byte.
pub const MAVLINK_STX_V2: u8 = 0xFD;

/// HEARTBEAT message ID.
pub const MSG_ID_HEARTBEAT: u32 = 0;

/// SYS_STATUS message ID.
pub const MSG_ID_SYS_STATUS: u32 = 1;

/// GPS_RAW_INT message ID.
pub const MSG_ID_GPS_RAW_INT: u32 = 24;

/// EKF_STATUS_REPORT message ID (ArduPilot dialect).
pub const MSG_ID_EKF_STATUS_REPORT: u32 = 193;

/// STATUSTEXT message ID.
pub const MSG_ID_STATUSTEXT: u32 = 253;

/// Maximum MAVLink frame size (v2 header + payload + CRC + signature).
pub const MAX_FRAME_SIZE: usize = 280;

/// Maximum payload length.
pub const MAX_PAYLOAD: usize = 255;

/// Length of the STATUSTEXT text field.
pub const STATUSTEXT_LEN: usize = 50;

/// `base_mode` bit set while the vehicle is armed.
pub const MAV_MODE_FLAG_SAFETY_ARMED: u8 = 0x80;

/// MAVLink 2 incompatibility flag: frame carries a signature.
const MAVLINK_IFLAG_SIGNED: u8 = 0x01;

/// Signature length appended to signed MAVLink 2 frames.
const SIGNATURE_LEN: usize = 13;

const HEADER_LEN_V1: usize = 6;
const HEADER_LEN_V2: usize = 10;
const CHECKSUM_LEN: usize = 2;

const CRC_EXTRA_HEARTBEAT: u8 = 50;
const CRC_EXTRA_SYS_STATUS: u8 = 124;
const CRC_EXTRA_GPS_RAW_INT: u8 = 24;
const CRC_EXTRA_EKF_STATUS_REPORT: u8 = 71;
const CRC_EXTRA_STATUSTEXT: u8 = 83;

/// CRC-16/MCRF4XX (MAVLink X.25) calculator.
const X25: Crc<u16> = Crc::<u16>::new(&CRC_16_MCRF4XX);

/// CRC_EXTRA seed for a message ID, if the message is decoded here.
#[must_use]
pub const fn crc_extra(msg_id: u32) -> Option<u8> {
    match msg_id {
        MSG_ID_HEARTBEAT => Some(CRC_EXTRA_HEARTBEAT),
        MSG_ID_SYS_STATUS => Some(CRC_EXTRA_SYS_STATUS),
        MSG_ID_GPS_RAW_INT => Some(CRC_EXTRA_GPS_RAW_INT),
        MSG_ID_EKF_STATUS_REPORT => Some(CRC_EXTRA_EKF_STATUS_REPORT),
        MSG_ID_STATUSTEXT => Some(CRC_EXTRA_STATUSTEXT),
        _ => None,
    }
}

/// Frame checksum over `data` (header without STX, plus payload) and the
/// message's CRC_EXTRA.
#[must_use]
pub fn frame_crc(data: &[u8], crc_extra: u8) -> u16 {
    let mut digest = X25.digest();
    digest.update(data);
    digest.update(&[crc_extra]);
    digest.finalize()
}

/// HEARTBEAT (ID 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Heartbeat {
    pub custom_mode: u32,
    pub mav_type: u8,
    pub autopilot: u8,
    pub base_mode: u8,
    pub system_status: u8,
}

impl Heartbeat {
    /// Check if the sender reports itself armed.
    #[inline]
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.base_mode & MAV_MODE_FLAG_SAFETY_ARMED != 0
    }
}

/// Battery fields of SYS_STATUS (ID 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SysStatus {
    /// Battery voltage in millivolts (`u16::MAX` = unknown).
    pub voltage_battery_mv: u16,
    /// Battery current in 10 mA units (-1 = unknown).
    pub current_battery_ca: i16,
    /// Remaining capacity in percent (-1 = unknown).
    pub battery_remaining: i8,
}

/// Fix fields of GPS_RAW_INT (ID 24).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpsRawInt {
    /// GPS_FIX_TYPE.
    pub fix_type: u8,
    pub satellites_visible: u8,
}

/// EKF_STATUS_REPORT (ID 193). Variances are normalised: 1.0 is the
/// innovation gate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EkfStatusReport {
    pub velocity_variance: f32,
    pub pos_horiz_variance: f32,
    pub pos_vert_variance: f32,
    pub compass_variance: f32,
    pub terrain_alt_variance: f32,
    pub flags: u16,
}

/// STATUSTEXT (ID 253).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusText {
    /// MAV_SEVERITY (0 = emergency .. 7 = debug).
    pub severity: u8,
    raw: [u8; STATUSTEXT_LEN],
}

impl StatusText {
    /// Create from severity and text; text longer than 50 bytes is cut.
    #[must_use]
    pub fn new(severity: u8, text: &[u8]) -> Self {
        let mut raw = [0u8; STATUSTEXT_LEN];
        let len = text.len().min(STATUSTEXT_LEN);
        raw[..len].copy_from_slice(&text[..len]);
        Self { severity, raw }
    }

    /// Text up to the first NUL.
    #[must_use]
    pub fn text(&self) -> &[u8] {
        let end = self.raw.iter().position(|&b| b == 0).unwrap_or(STATUSTEXT_LEN);
        &self.raw[..end]
    }
}

/// Parsed MAVLink message.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MavMessage {
    Heartbeat(Heartbeat),
    SysStatus(SysStatus),
    GpsRawInt(GpsRawInt),
    EkfStatusReport(EkfStatusReport),
    StatusText(StatusText),
    Unknown(u32),
}

/// A parsed message with its sender.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub system_id: u8,
    pub component_id: u8,
    pub message: MavMessage,
}

/// Parser error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Frame would not fit the receive buffer.
    Oversized,
    /// CRC mismatch.
    CrcError,
}

/// MAVLink frame parser.
pub struct MavlinkParser {
    buffer: [u8; MAX_FRAME_SIZE],
    pos: usize,
    state: ParserState,
}

#[derive(Clone, Copy)]
enum ParserState {
    WaitingForStart,
    ReadingHeader,
    ReadingBody { expected_len: usize },
}

impl MavlinkParser {
    /// Create a new parser.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0u8; MAX_FRAME_SIZE],
            pos: 0,
            state: ParserState::WaitingForStart,
        }
    }

    /// Reset parser state.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.state = ParserState::WaitingForStart;
    }

    /// Feed a byte to the parser.
    ///
    /// Returns `Some(frame)` once a complete valid frame has been parsed.
    /// On error the parser resynchronises on the next start byte.
    pub fn push_byte(&mut self, byte: u8) -> Result<Option<Frame>, ParseError> {
        match self.state {
            ParserState::WaitingForStart => {
                if byte == MAVLINK_STX_V1 || byte == MAVLINK_STX_V2 {
                    self.buffer[0] = byte;
                    self.pos = 1;
                    self.state = ParserState::ReadingHeader;
                }
                Ok(None)
            }
            ParserState::ReadingHeader => {
                self.buffer[self.pos] = byte;
                self.pos += 1;

                let header_len = self.header_len();
                if self.pos >= header_len {
                    let payload_len = self.buffer[1] as usize;
                    let signed = self.is_v2() && self.buffer[2] & MAVLINK_IFLAG_SIGNED != 0;
                    let signature_len = if signed { SIGNATURE_LEN } else { 0 };
                    let expected_len = header_len + payload_len + CHECKSUM_LEN + signature_len;

                    if expected_len > MAX_FRAME_SIZE {
                        self.reset();
                        return Err(ParseError::Oversized);
                    }

                    self.state = ParserState::ReadingBody { expected_len };
                }
                Ok(None)
            }
            ParserState::ReadingBody { expected_len } => {
                self.buffer[self.pos] = byte;
                self.pos += 1;

                if self.pos >= expected_len {
                    let result = self.parse_frame();
                    self.reset();
                    result.map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }

    #[inline]
    fn is_v2(&self) -> bool {
        self.buffer[0] == MAVLINK_STX_V2
    }

    #[inline]
    fn header_len(&self) -> usize {
        if self.is_v2() {
            HEADER_LEN_V2
        } else {
            HEADER_LEN_V1
        }
    }

    /// Parse a complete frame held in the buffer.
    fn parse_frame(&self) -> Result<Frame, ParseError> {
        let header_len = self.header_len();
        let payload_len = self.buffer[1] as usize;

        let (system_id, component_id, msg_id) = if self.is_v2() {
            let id = (self.buffer[7] as u32)
                | ((self.buffer[8] as u32) << 8)
                | ((self.buffer[9] as u32) << 16);
            (self.buffer[5], self.buffer[6], id)
        } else {
            (self.buffer[3], self.buffer[4], self.buffer[5] as u32)
        };

        let frame = |message| Frame {
            system_id,
            component_id,
            message,
        };

        let Some(extra) = crc_extra(msg_id) else {
            return Ok(frame(MavMessage::Unknown(msg_id)));
        };

        let crc_start = header_len + payload_len;
        let calculated = frame_crc(&self.buffer[1..crc_start], extra);
        let received = u16::from_le_bytes([self.buffer[crc_start], self.buffer[crc_start + 1]]);
        if calculated != received {
            return Err(ParseError::CrcError);
        }

        // MAVLink 2 strips trailing zero bytes; restore them before decoding.
        let mut payload = [0u8; MAX_PAYLOAD];
        payload[..payload_len].copy_from_slice(&self.buffer[header_len..crc_start]);

        Ok(frame(decode(msg_id, &payload)))
    }
}

impl Default for MavlinkParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a zero-extended payload. Field offsets follow MAVLink wire order
/// (fields sorted by size).
fn decode(msg_id: u32, p: &[u8; MAX_PAYLOAD]) -> MavMessage {
    match msg_id {
        MSG_ID_HEARTBEAT => MavMessage::Heartbeat(Heartbeat {
            custom_mode: u32_at(p, 0),
            mav_type: p[4],
            autopilot: p[5],
            base_mode: p[6],
            system_status: p[7],
        }),
        MSG_ID_SYS_STATUS => MavMessage::SysStatus(SysStatus {
            voltage_battery_mv: u16_at(p, 14),
            current_battery_ca: u16_at(p, 16) as i16,
            battery_remaining: p[30] as i8,
        }),
        MSG_ID_GPS_RAW_INT => MavMessage::GpsRawInt(GpsRawInt {
            fix_type: p[28],
            satellites_visible: p[29],
        }),
        MSG_ID_EKF_STATUS_REPORT => MavMessage::EkfStatusReport(EkfStatusReport {
            velocity_variance: f32_at(p, 0),
            pos_horiz_variance: f32_at(p, 4),
            pos_vert_variance: f32_at(p, 8),
            compass_variance: f32_at(p, 12),
            terrain_alt_variance: f32_at(p, 16),
            flags: u16_at(p, 20),
        }),
        MSG_ID_STATUSTEXT => MavMessage::StatusText(StatusText::new(
            p[0],
            &p[1..1 + STATUSTEXT_LEN],
        )),
        other => MavMessage::Unknown(other),
    }
}

#[inline]
fn u16_at(p: &[u8], i: usize) -> u16 {
    u16::from_le_bytes([p[i], p[i + 1]])
}

#[inline]
fn u32_at(p: &[u8], i: usize) -> u32 {
    u32::from_le_bytes([p[i], p[i + 1], p[i + 2], p[i + 3]])
}

#[inline]
fn f32_at(p: &[u8], i: usize) -> f32 {
    f32::from_bits(u32_at(p, i))
}
