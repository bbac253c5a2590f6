//! Domain-wide limits and defaults

/// Usernames
pub const MIN_USERNAME_LENGTH: usize = 2;
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Account passwords (argon2 input)
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Poster-facing fields
pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_TRIPCODE_PASSWORD_LENGTH: usize = 80;
pub const MAX_SUBJECT_LENGTH: usize = 255;
pub const MAX_POST_LENGTH: usize = 10_000;

/// Boards
pub const MAX_BOARD_LABEL_LENGTH: usize = 16;
pub const MAX_BOARD_NAME_LENGTH: usize = 32;
pub const THREADS_PER_PAGE: i64 = 10;
pub const DEFAULT_BUMP_LIMIT: i32 = 300;
pub const DEFAULT_THREAD_LIMIT: i32 = 100;
pub const DEFAULT_POSTER_NAME: &str = "Anonymous";

/// Tripcodes are rendered as `SEPARATOR` followed by the last `TRIPCODE_LENGTH`
/// characters of the secret's digest.
pub const TRIPCODE_SEPARATOR: &str = "!";
pub const TRIPCODE_LENGTH: usize = 10;

pub const POSTER_THREAD_ID_LENGTH: usize = 8;
pub const DELETION_CODE_LENGTH: usize = 16;
pub const USER_TOKEN_LENGTH: usize = 48;

/// Thumbnails
pub const THUMBNAIL_MAX_WIDTH: u32 = 250;
pub const THUMBNAIL_MAX_HEIGHT: u32 = 250;
pub const DEFAULT_THUMBNAIL_EXTENSION: &str = "png";
pub const THUMBNAIL_FOLDER: &str = "thumbs";

/// Token lifetimes in minutes
pub const PASSWORD_RESET_TOKEN_TTL_MINUTES: i64 = 30;
pub const EMAIL_VERIFICATION_TOKEN_TTL_MINUTES: i64 = 24 * 60;
