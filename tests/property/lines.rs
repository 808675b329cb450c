use proptest::prelude::*;
use termrun::exec::lines::{chunk_from_text, LineSplitter};

// Text without the flush marker ambiguity: any mix of letters and newlines.
fn stream_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop_oneof![Just('\n'), Just('a'), Just('b'), Just('é')], 0..64)
        .prop_map(|chars| chars.into_iter().collect())
}

// Cut points (as char counts) used to split the stream into reads.
fn cuts_strategy() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0..64usize, 0..8)
}

fn split_into_reads(stream: &str, mut cuts: Vec<usize>) -> Vec<String> {
    let chars: Vec<char> = stream.chars().collect();
    cuts.iter_mut().for_each(|c| *c = (*c).min(chars.len()));
    cuts.push(chars.len());
    cuts.sort_unstable();
    cuts.dedup();

    let mut reads = Vec::new();
    let mut start = 0;
    for end in cuts {
        reads.push(chars[start..end].iter().collect());
        start = end;
    }
    reads
}

proptest! {
    #[test]
    fn test_lines_rejoin_to_original_stream(
        stream in stream_strategy(),
        cuts in cuts_strategy(),
    ) {
        let mut splitter = LineSplitter::new();
        let mut lines = Vec::new();

        for read in split_into_reads(&stream, cuts) {
            lines.extend(splitter.feed(&chunk_from_text(&read)));
        }
        lines.extend(splitter.feed(&[""]));

        // Every '\n' terminates exactly one line; an unterminated tail is
        // emitted by the flush.
        let newlines = stream.matches('\n').count();
        let tail_len = stream.len() - stream.rfind('\n').map_or(0, |i| i + 1);
        let expected_count = newlines + usize::from(tail_len > 0);
        prop_assert_eq!(lines.len(), expected_count);

        let mut rejoined = lines.join("\n");
        if stream.ends_with('\n') {
            rejoined.push('\n');
        }
        prop_assert_eq!(rejoined, stream);
        prop_assert!(!splitter.has_pending());
    }

    #[test]
    fn test_single_chunk_matches_str_lines(stream in stream_strategy()) {
        let mut splitter = LineSplitter::new();
        let mut lines = splitter.feed(&chunk_from_text(&stream));
        lines.extend(splitter.flush());

        let expected: Vec<String> = stream.lines().map(str::to_string).collect();
        prop_assert_eq!(lines, expected);
    }
}
