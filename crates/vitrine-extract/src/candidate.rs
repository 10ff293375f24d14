//! Per-field candidate resolution.
//!
//! Every strategy contributes a [`PartialRecord`]; each populated field
//! becomes an [`ExtractionCandidate`] ranked by the strategy that produced
//! it. The best-ranked candidate wins regardless of the order in which
//! strategies were run.

use std::collections::BTreeMap;

use vitrine_core::{Availability, Field, PriceQuote, ProductRecord, Strategy};

use crate::strategy::PartialRecord;

/// A tentative value for one field.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtractionCandidate<T> {
    pub value: T,
    pub strategy: Strategy,
}

/// Holds the best candidate offered so far for one field.
#[derive(Debug)]
struct Slot<T> {
    best: Option<ExtractionCandidate<T>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self { best: None }
    }
}

impl<T> Slot<T> {
    /// Keeps `value` if it outranks the current candidate. Equal rank keeps
    /// the earlier value.
    fn offer(&mut self, value: Option<T>, strategy: Strategy) {
        let Some(value) = value else {
            return;
        };
        let outranked = self
            .best
            .as_ref()
            .is_none_or(|current| strategy < current.strategy);
        if outranked {
            self.best = Some(ExtractionCandidate { value, strategy });
        }
    }

    fn is_filled(&self) -> bool {
        self.best.is_some()
    }

    fn into_inner(self) -> Option<ExtractionCandidate<T>> {
        self.best
    }
}

/// Candidates for every field of a [`ProductRecord`].
#[derive(Debug, Default)]
pub(crate) struct CandidateSet {
    name: Slot<String>,
    brand: Slot<String>,
    quote: Slot<PriceQuote>,
    currency: Slot<String>,
    availability: Slot<Availability>,
    /// `Unknown` is recorded apart so any confident label outranks it.
    availability_unknown: Slot<Availability>,
}

impl CandidateSet {
    pub(crate) fn absorb(&mut self, strategy: Strategy, partial: PartialRecord) {
        self.name.offer(partial.name, strategy);
        self.brand.offer(partial.brand, strategy);
        self.quote
            .offer(partial.quote.filter(|q| !q.is_empty()), strategy);
        self.currency.offer(partial.currency, strategy);
        match partial.availability {
            Some(Availability::Unknown) => {
                self.availability_unknown
                    .offer(Some(Availability::Unknown), strategy);
            }
            other => self.availability.offer(other, strategy),
        }
    }

    /// Returns `true` once every field holds a confident candidate.
    pub(crate) fn is_complete(&self) -> bool {
        self.name.is_filled()
            && self.brand.is_filled()
            && self.quote.is_filled()
            && self.currency.is_filled()
            && self.availability.is_filled()
    }

    /// Builds the final record. A currency is only reported next to a price.
    pub(crate) fn into_record(self, source_url: &str) -> ProductRecord {
        let mut sources = BTreeMap::new();
        let mut record = ProductRecord::empty(source_url);

        if let Some(c) = self.name.into_inner() {
            sources.insert(Field::Name, c.strategy);
            record.name = Some(c.value);
        }
        if let Some(c) = self.brand.into_inner() {
            sources.insert(Field::Brand, c.strategy);
            record.brand = Some(c.value);
        }
        if let Some(c) = self.quote.into_inner() {
            sources.insert(Field::Price, c.strategy);
            record.price = c.value.price;
            record.list_price = c.value.list_price;
            record.selling_price = c.value.selling_price;
            record.price_suspect = c.value.is_suspect();

            if let Some(c) = self.currency.into_inner() {
                sources.insert(Field::Currency, c.strategy);
                record.currency = Some(c.value);
            }
        }
        if let Some(c) = self
            .availability
            .into_inner()
            .or_else(|| self.availability_unknown.into_inner())
        {
            sources.insert(Field::Availability, c.strategy);
            record.availability = Some(c.value);
        }

        record.sources = sources;
        record
    }
}
