// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-based test suites

mod acquisition;
