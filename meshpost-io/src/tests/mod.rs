//! Cross-format tests for meshpost-io
//!
//! These cover extension dispatch and the scene view of every format.

mod format_dispatch_tests;
