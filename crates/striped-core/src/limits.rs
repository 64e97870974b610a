//! Wire-size bounds for the management and content-port protocols.

/// Maximum UDP payload this service will ever send or accept.
pub const MAX_DATAGRAM_BYTES: usize = 65_535;

/// Management-port messages (registration, DSS/file metadata) must fit here.
pub const MAX_MANAGEMENT_BYTES: usize = 12_000;

/// Content-port block payloads (post base64 + JSON envelope) must fit here.
pub const MAX_BLOCK_DATAGRAM_BYTES: usize = 64_000;

/// Lower bound for a DSS's striping unit `b`, in bytes.
pub const MIN_STRIPING_UNIT: u64 = 128;

/// Upper bound for a DSS's striping unit `b`, in bytes.
pub const MAX_STRIPING_UNIT: u64 = 1 << 20;

/// Minimum disk count for a DSS.
pub const MIN_DSS_DISKS: usize = 3;

/// Per-RPC timeout used for every manager command and content-port block
/// request.
pub const BLOCK_RPC_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(1);

/// Retry budget for a stripe whose read comes back corrupted or short.
pub const MAX_STRIPE_RETRIES: u32 = 5;

/// base64 expands `b` bytes to `ceil(b/3)*4` bytes; reject any `b` whose
/// encoded block plus a generous JSON envelope overhead would not fit in one
/// datagram, rather than fragment a block across multiple packets.
#[must_use]
pub fn striping_unit_fits_one_datagram(b: u64) -> bool {
    let encoded = b.div_ceil(3) * 4;
    const JSON_ENVELOPE_OVERHEAD: u64 = 512;
    encoded + JSON_ENVELOPE_OVERHEAD <= MAX_BLOCK_DATAGRAM_BYTES as u64
}
