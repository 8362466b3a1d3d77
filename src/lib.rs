// ==============================================================================
// lib.rs - ncRNA Profiler Library
// ==============================================================================
// Description: Library interface for cmscan report processing modules
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================

pub mod parsers;
pub mod models;
pub mod family_filter;
pub mod profile;
pub mod output;
pub mod processor;
pub mod amino_acids;
