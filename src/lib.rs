/*!
# Procedure Restyler

A small internal web tool for restyling the HTML that stored procedures emit.

## Overview

Reporting procedures in the database build HTML at run time by
concatenating string literals. This tool fetches such a procedure's source,
rewrites the embedded markup into a consistent style, lets the user edit the
result in the browser and writes it back as the new definition.

## Architecture

### Frontend Layer
- **Technologies**: HTML, JavaScript
- A single page for uploading a spreadsheet of procedure names, fetching a
  procedure, editing the restyled source, saving it and downloading a backup

### Backend Layer
- **Technologies**: Rust, axum, tokio
- **Core Components**:
  - HTML Transformation Routine - Regex rules for header, table and cell fragments
  - Procedure Source Accessor - Reads `ALL_SOURCE`, replaces and commits definitions
  - Spreadsheet Name Extractor - Pulls the `NAME` column out of an uploaded workbook
  - Backup Builder - Wraps a source as a `<name>.sql` attachment

### Data Layer
- Oracle, one connection per request, no pooling
- Last write wins; no versioning of replaced definitions

## Modules

- **transform**: Pure text-to-text restyling of embedded HTML
- **procedure**: `ProcedureStore` trait with Oracle and in-memory stores
- **loader**: Spreadsheet name extraction
- **downloader**: Backup attachment construction
- **config**: Command-line / environment configuration
- **error**: Error kinds shared by every operation
- **app**: Routing and handlers (feature `web`)

## REST API Endpoints

- `GET /` - Landing page
- `POST /upload_excel` - Multipart `file` → `{names}`
- `POST /fetch_procedure` - `{name}` → `{name, original, transformed}`
- `POST /save_procedure` - `{name, new_text}` → `{status, message, old_source}`
- `POST /download_backup` - `{name}` → `<name>.sql` attachment
*/

#[cfg(feature = "web")]
pub mod app;
pub mod config;
pub mod downloader;
pub mod error;
pub mod loader;
pub mod procedure;
pub mod transform;

/// Re-export the common entry points
pub use error::{AppError, ErrorKind};
pub use loader::extract_names;
pub use procedure::{MemoryStore, ProcedureStore};
pub use transform::transform;
