/// Read a big-endian unsigned integer of up to 8 bytes.
#[inline]
pub(crate) fn read_uint_from_be_bytes(buf: &[u8]) -> u64 {
    let mut out = [0; 8];
    assert!(buf.len() <= out.len());
    let start = out.len() - buf.len();
    out[start..].copy_from_slice(buf);
    u64::from_be_bytes(out)
}

#[test]
fn test_read_uint_be() {
    assert_eq!(read_uint_from_be_bytes(&[0x81, 0x23, 0x45]), 0x812345);
    assert_eq!(read_uint_from_be_bytes(&[]), 0);
    assert_eq!(
        read_uint_from_be_bytes(&[0xff; 8]),
        u64::MAX
    );
}
