// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for persistent data | `/var/lib/hhn-kyc/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SANDBOX_API_BASE_URL` | eKYC provider base URL | `https://api.sandbox.co.in` |
//! | `SANDBOX_API_KEY` | eKYC provider API key | Required |
//! | `SANDBOX_API_SECRET` | eKYC provider API secret | Required |
//! | `SANDBOX_API_VERSION` | eKYC provider API version header | `2.0` |
//! | `APP_JWT_SECRET` | Shared HS256 secret for bearer tokens | Required for production |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the data directory path.
///
/// All profiles, in-flight verification attempts, and audit logs are
/// stored here.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the shared JWT signing secret.
///
/// When unset the service runs in development mode and does not verify
/// token signatures.
pub const JWT_SECRET_ENV: &str = "APP_JWT_SECRET";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
