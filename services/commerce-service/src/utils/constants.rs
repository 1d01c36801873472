// /commerce/services/commerce-service/src/utils/constants.rs

/// Pagination default untuk list endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Setting keys yang dibaca ke ShopSettings
pub const SETTING_TAX: &str = "tax";
pub const SETTING_PAYMENT_METHODS: &str = "payment_methods";

/// Header identity yang di-forward oleh api gateway
pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_USER_ROLE: &str = "x-user-role";

/// Status provider yang berarti user menyelesaikan pembayaran
pub const GATEWAY_STATUS_OK: &str = "OK";

/// Kode sukses gateway; 101 = sudah pernah di-verify
pub const GATEWAY_CODE_SUCCESS: i64 = 100;
pub const GATEWAY_CODE_ALREADY_VERIFIED: i64 = 101;

/// Menit sebelum payment yang sudah dikirim ke gateway dianggap abandoned
pub const DEFAULT_PAYMENT_WINDOW_MINUTES: i64 = 30;
