//! Helpers shared by tests that spawn a stand-in OCR engine.

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
#[cfg(unix)]
use std::path::{Path, PathBuf};

/// Serializes tests that write and then exec a script, so a concurrent
/// fork cannot hold the script open for writing (ETXTBSY).
#[cfg(unix)]
pub(crate) static ENGINE_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

/// Write an executable `/bin/sh` script standing in for the engine.
///
/// The child environment is cleared, so `body` may only use shell builtins.
#[cfg(unix)]
pub(crate) fn fake_engine(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Sample invoice text as an engine would return it.
pub(crate) const SAMPLE_INVOICE: &str = "\
ACME Corporation
123 Business Street
City, State 12345

INVOICE

Invoice Number: INV-2024-001
Invoice Date: 01/15/2024
Due Date: 02/15/2024

Bill To:
John Doe Company
456 Customer Ave
Customer City, State 67890

Description                 Qty    Unit Price    Total
Consulting Services         10     $150.00       $1,500.00
Software License            1      $500.00       $500.00
Support Package             12     $50.00        $600.00

Subtotal:                                        $2,600.00
Tax (8.5%):                                      $221.00
Total Amount:                                    $2,821.00

Payment Terms: Net 30
";
