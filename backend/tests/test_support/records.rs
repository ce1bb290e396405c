//! Session records as the upstream framework writes them.

/// {'_auth_user_id': '42', '_auth_user_backend': 'pkg.Backend'}, protocol 4
pub const USER_42: &[u8] = b"\x80\x04\x95=\x00\x00\x00\x00\x00\x00\x00}\x94(\x8c\x0d_auth_user_id\x94\x8c\x0242\x94\x8c\x12_auth_user_backend\x94\x8c\x0bpkg.Backend\x94u.";

/// {'_auth_user_id': '5'}, protocol 0
pub const USER_5_PROTOCOL0: &[u8] = b"(dp0\nV_auth_user_id\np1\nV5\np2\ns.";

/// {'_auth_user_id': '1', 'when': datetime.date(2020, 1, 1)}, protocol 4
pub const WITH_DATE: &[u8] = b"\x80\x04\x95?\x00\x00\x00\x00\x00\x00\x00}\x94(\x8c\x0d_auth_user_id\x94\x8c\x011\x94\x8c\x04when\x94\x8c\x08datetime\x94\x8c\x04date\x94\x93\x94C\x04\x07\xe4\x01\x01\x94\x85\x94R\x94u.";

/// {'cart': [1, 2]}, an anonymous session
pub const ANONYMOUS: &[u8] = b"\x80\x04\x95\x13\x00\x00\x00\x00\x00\x00\x00}\x94\x8c\x04cart\x94]\x94(K\x01K\x02es.";
