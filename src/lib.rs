// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shopcrawl library — sequential storefront catalog crawler.
//!
//! Walks a site's nested XML sitemaps down to product pages, extracts
//! product metadata and breadcrumb categories, and serializes a
//! deduplicated category tree plus the product list as CSV with
//! deterministic identifiers.

pub mod canon;
pub mod catalog;
pub mod cli;
pub mod crawler;
pub mod export;
pub mod extract;
pub mod ident;
pub mod net;
pub mod sitemap;
