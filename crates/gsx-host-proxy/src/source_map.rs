//! Bidirectional DSL ↔ generated-host-file position mapping.
//!
//! The generator records one [`MappedSpan`] per synthesized token as it
//! writes the virtual host file; [`SourceMap`] answers position queries in
//! either direction without re-walking the AST.

use gsx_position::DslPosition;
use rustc_hash::FxHashMap;

/// A 1-indexed line/column position in the synthesized host-language
/// buffer. Kept distinct from [`DslPosition`] even though the shape is
/// identical, the same way the rest of the workspace keeps DSL and wire
/// coordinates in separate types rather than conflating two buffers that
/// happen to use the same representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenPosition {
    /// 1-indexed line number in the generated buffer.
    pub line: u32,
    /// 1-indexed column number (UTF-8 character count from line start).
    pub column: u32,
}

impl GenPosition {
    /// The first position in a generated buffer.
    pub const START: GenPosition = GenPosition { line: 1, column: 1 };

    /// Creates a new generated-buffer position.
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy)]
struct MappedSpan {
    dsl: DslPosition,
    gen: GenPosition,
    length: u32,
}

/// Records DSL ↔ generated-buffer span pairs produced during virtual-file
/// generation, indexed by line for near-O(1) translation lookups.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    spans: Vec<MappedSpan>,
    by_dsl_line: FxHashMap<u32, Vec<usize>>,
    by_gen_line: FxHashMap<u32, Vec<usize>>,
}

impl SourceMap {
    /// Creates an empty source map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one mapped span: `length` DSL characters starting at
    /// `(dsl_line, dsl_col)` correspond to `length` generated characters
    /// starting at `(gen_line, gen_col)`.
    pub fn add_span(&mut self, dsl_line: u32, dsl_col: u32, gen_line: u32, gen_col: u32, length: u32) {
        if length == 0 {
            return;
        }
        let index = self.spans.len();
        self.spans.push(MappedSpan {
            dsl: DslPosition::new(dsl_line, dsl_col),
            gen: GenPosition::new(gen_line, gen_col),
            length,
        });
        self.by_dsl_line.entry(dsl_line).or_default().push(index);
        self.by_gen_line.entry(gen_line).or_default().push(index);
    }

    /// Translates a DSL position to its generated-buffer equivalent.
    ///
    /// Returns the input position unchanged with `found = false` when no
    /// span covers it, so callers can fall back gracefully.
    pub fn dsl_to_gen(&self, dsl_line: u32, dsl_col: u32) -> (u32, u32, bool) {
        let Some(candidates) = self.by_dsl_line.get(&dsl_line) else { return (dsl_line, dsl_col, false) };
        for &index in candidates {
            let span = &self.spans[index];
            if dsl_col >= span.dsl.column && dsl_col < span.dsl.column + span.length {
                let delta = dsl_col - span.dsl.column;
                return (span.gen.line, span.gen.column + delta, true);
            }
        }
        (dsl_line, dsl_col, false)
    }

    /// Translates a generated-buffer position back to its DSL equivalent.
    ///
    /// Returns the input position unchanged with `found = false` when no
    /// span covers it.
    pub fn gen_to_dsl(&self, gen_line: u32, gen_col: u32) -> (u32, u32, bool) {
        let Some(candidates) = self.by_gen_line.get(&gen_line) else { return (gen_line, gen_col, false) };
        for &index in candidates {
            let span = &self.spans[index];
            if gen_col >= span.gen.column && gen_col < span.gen.column + span.length {
                let delta = gen_col - span.gen.column;
                return (span.dsl.line, span.dsl.column + delta, true);
            }
        }
        (gen_line, gen_col, false)
    }

    /// True if the given DSL position falls inside any recorded span, i.e.
    /// the cursor sits on text that was forwarded to the host-language
    /// buffer.
    pub fn in_host_expression(&self, dsl_line: u32, dsl_col: u32) -> bool {
        self.dsl_to_gen(dsl_line, dsl_col).2
    }

    /// Number of spans recorded, for tests and diagnostics.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// True if no spans have been recorded.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_position_reports_not_found() {
        let map = SourceMap::new();
        assert_eq!(map.dsl_to_gen(3, 4), (3, 4, false));
        assert_eq!(map.gen_to_dsl(3, 4), (3, 4, false));
        assert!(!map.in_host_expression(3, 4));
    }

    #[test]
    fn mapped_span_round_trips_every_offset_within_it() {
        let mut map = SourceMap::new();
        map.add_span(5, 10, 12, 3, 4);

        for offset in 0..4 {
            let (gl, gc, found) = map.dsl_to_gen(5, 10 + offset);
            assert!(found);
            assert_eq!((gl, gc), (12, 3 + offset));

            let (dl, dc, found) = map.gen_to_dsl(gl, gc);
            assert!(found);
            assert_eq!((dl, dc), (5, 10 + offset));
        }
    }

    #[test]
    fn position_just_past_span_is_not_covered() {
        let mut map = SourceMap::new();
        map.add_span(1, 1, 1, 1, 3);

        assert!(map.in_host_expression(1, 1));
        assert!(map.in_host_expression(1, 3));
        assert!(!map.in_host_expression(1, 4));
    }

    #[test]
    fn multiple_spans_on_the_same_line_are_disambiguated_by_column() {
        let mut map = SourceMap::new();
        map.add_span(2, 1, 2, 1, 3);
        map.add_span(2, 10, 2, 20, 5);

        assert_eq!(map.dsl_to_gen(2, 2), (2, 2, true));
        assert_eq!(map.dsl_to_gen(2, 12), (2, 22, true));
        assert_eq!(map.dsl_to_gen(2, 7), (2, 7, false));
    }

    #[test]
    fn zero_length_spans_are_never_recorded() {
        let mut map = SourceMap::new();
        map.add_span(1, 1, 1, 1, 0);
        assert!(map.is_empty());
    }

    use proptest::prelude::*;

    proptest! {
        /// Property 1: every offset inside a recorded span round-trips
        /// through `dsl_to_gen`/`gen_to_dsl` back to itself, for arbitrary
        /// span placements and lengths.
        #[test]
        fn every_offset_in_a_span_round_trips(
            dsl_line in 0u32..500,
            dsl_col in 0u32..500,
            gen_line in 0u32..500,
            gen_col in 0u32..500,
            length in 1u32..64,
            offset in 0u32..64,
        ) {
            let offset = offset % length;
            let mut map = SourceMap::new();
            map.add_span(dsl_line, dsl_col, gen_line, gen_col, length);

            let (gl, gc, found) = map.dsl_to_gen(dsl_line, dsl_col + offset);
            prop_assert!(found);
            prop_assert_eq!((gl, gc), (gen_line, gen_col + offset));

            let (dl, dc, found) = map.gen_to_dsl(gl, gc);
            prop_assert!(found);
            prop_assert_eq!((dl, dc), (dsl_line, dsl_col + offset));
        }

        /// Property 1 (converse): positions outside every recorded span
        /// are reported as not found, by both translation directions.
        #[test]
        fn positions_outside_every_span_are_not_found(
            dsl_line in 0u32..500, dsl_col in 0u32..500,
            gen_line in 0u32..500, gen_col in 0u32..500,
            span_dsl_line in 0u32..500, span_gen_line in 0u32..500,
            length in 1u32..64,
        ) {
            let map_is_empty = SourceMap::new();
            prop_assert_eq!(map_is_empty.dsl_to_gen(dsl_line, dsl_col), (dsl_line, dsl_col, false));
            prop_assert_eq!(map_is_empty.gen_to_dsl(gen_line, gen_col), (gen_line, gen_col, false));

            // Same check against a non-empty map that maps a disjoint line.
            let mut map = SourceMap::new();
            map.add_span(span_dsl_line, 0, span_gen_line, 0, length);
            if dsl_line != span_dsl_line {
                prop_assert_eq!(map.dsl_to_gen(dsl_line, dsl_col), (dsl_line, dsl_col, false));
            }
            if gen_line != span_gen_line {
                prop_assert_eq!(map.gen_to_dsl(gen_line, gen_col), (gen_line, gen_col, false));
            }
        }
    }
}
