#![allow(dead_code)]

use dynwire_core::WireMessage;
use tracing_subscriber::EnvFilter;

/// Routes library logs to the test output; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_target(false)
        .try_init();
}

/// One field of every varint, fixed64 and fixed32 scalar type, numbered
/// 1 through 14 in descriptor declaration order of the reference message.
pub fn reference_message() -> WireMessage {
    let mut m = WireMessage::new();
    m.encode_int32(1, 32_423);
    m.encode_int64(2, -98_327);
    m.encode_uint32(3, 1);
    m.encode_uint64(4, 962_329);
    m.encode_sint32(5, -231);
    m.encode_sint64(6, -3_932_764_127);
    m.encode_bool(7, true);
    m.encode_enum(8, 3);
    m.encode_fixed64(9, 342_647_260_612);
    m.encode_sfixed64(10, -324);
    m.encode_double(11, 3.1456);
    m.encode_fixed32(12, 445_545);
    m.encode_sfixed32(13, -30_423);
    m.encode_float(14, 3.227_799);
    m
}
