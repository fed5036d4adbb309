//! Shared constants for end-to-end tests
//!
//! Every credential, token, and resource id the mock Baserow instance
//! knows about lives here. When mock data changes, update only this file.

// ============================================================================
// Test Credentials
// ============================================================================

/// Username the mock accepts for JWT login
pub const TEST_USERNAME: &str = "admin@example.com";

/// Password the mock accepts for JWT login
pub const TEST_PASSWORD: &str = "hunter2!";

// ============================================================================
// Test Tokens
// ============================================================================

/// Database-scoped token, valid for row operations only
pub const TEST_DATABASE_TOKEN: &str = "dbtok-9f8e7d6c5b4a";

/// Pre-issued JWT supplied directly (token-direct mode)
pub const TEST_JWT: &str = "jwt-preissued-aaa.bbb.ccc";

/// JWT the mock mints for a successful username/password login
pub const SESSION_JWT: &str = "jwt-session-ddd.eee.fff";

/// Refresh token issued alongside `SESSION_JWT`
pub const VALID_REFRESH_TOKEN: &str = "refresh-0123456789abcdef";

// ============================================================================
// Test Workspaces
// ============================================================================

/// Workspace "Engineering"
pub const WORKSPACE_1_ID: i64 = 10;

/// Workspace 1 name
pub const WORKSPACE_1_NAME: &str = "Engineering";

/// Workspace "Marketing"
pub const WORKSPACE_2_ID: i64 = 20;

/// Workspace 2 name
pub const WORKSPACE_2_NAME: &str = "Marketing";

/// Id assigned to a workspace created through the mock
pub const CREATED_WORKSPACE_ID: i64 = 30;

// ============================================================================
// Test Applications
// ============================================================================

/// Database application in workspace 1
pub const DATABASE_1_ID: i64 = 100;

/// Database 1 name
pub const DATABASE_1_NAME: &str = "Projects DB";

/// Database application in workspace 2
pub const DATABASE_2_ID: i64 = 200;

/// Database 2 name
pub const DATABASE_2_NAME: &str = "Campaign Tracker";

/// Non-database application in workspace 1, filtered out of database listings
pub const NON_DATABASE_APP_ID: i64 = 150;

/// Non-database application name
pub const NON_DATABASE_APP_NAME: &str = "Internal Portal";

/// Id assigned to a database created through the mock
pub const CREATED_DATABASE_ID: i64 = 900;

// ============================================================================
// Test Tables and Fields
// ============================================================================

/// Table "Tasks" in database 1, the only table holding rows
pub const TABLE_1_ID: i64 = 1000;

/// Table 1 name
pub const TABLE_1_NAME: &str = "Tasks";

/// Table "Milestones" in database 1, no fields and no rows
pub const TABLE_2_ID: i64 = 1001;

/// Table 2 name
pub const TABLE_2_NAME: &str = "Milestones";

/// Id assigned to a table created through the mock
pub const CREATED_TABLE_ID: i64 = 1002;

/// Primary text field "Name" on table 1
pub const FIELD_NAME_ID: i64 = 5001;

/// Long text field "Notes" on table 1
pub const FIELD_NOTES_ID: i64 = 5002;

// ============================================================================
// Test Rows
// ============================================================================

/// First row of table 1
pub const ROW_1_ID: i64 = 1;

/// Row 1 "Name" cell
pub const ROW_1_NAME: &str = "Ship the release";

/// Second row of table 1
pub const ROW_2_ID: i64 = 2;

/// Row 2 "Name" cell
pub const ROW_2_NAME: &str = "Write the docs";

/// Id assigned to the first row created through the mock
pub const CREATED_ROW_ID: i64 = 3;

// ============================================================================
// Test Timeouts
// ============================================================================

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
