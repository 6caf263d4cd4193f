//! Property tests: chunk boundaries, merge order and worker count never
//! change the final table.

use proptest::prelude::*;
use station_agg::parser::parse_records;
use station_agg::{AggregateTable, ChunkReader, FixedPoint, Pipeline, PipelineConfig};

const KEYS: &[&str] = &["Hamburg", "Bulawayo", "Palembang", "Zürich", "St. John's", "X", ""];

fn records() -> impl Strategy<Value = Vec<(usize, i16)>> {
    prop::collection::vec((0..KEYS.len(), -999i16..=999), 0..200)
}

fn render(records: &[(usize, i16)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (key, tenths) in records {
        out.extend_from_slice(KEYS[*key].as_bytes());
        out.push(b';');
        out.extend_from_slice(FixedPoint::from_tenths(*tenths).to_string().as_bytes());
        out.push(b'\n');
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_pipeline_matches_single_pass(
        records in records(),
        block_size in 1usize..96,
        workers in 1usize..5,
    ) {
        let input = render(&records);
        let expected = parse_records(&input, 0).unwrap();
        let config = PipelineConfig::new("unused")
            .with_block_size(block_size)
            .with_workers(workers)
            .with_chunk_queue_capacity(2)
            .with_result_queue_capacity(1);
        let output = Pipeline::new(config).unwrap().run_reader(&input[..]).unwrap();
        prop_assert_eq!(output.table, expected);
    }

    #[test]
    fn prop_chunks_hold_whole_records(records in records(), block_size in 1usize..64) {
        let input = render(&records);
        let chunks: Vec<_> = ChunkReader::new(&input[..], block_size)
            .collect::<Result<_, _>>()
            .unwrap();

        let mut rebuilt = Vec::new();
        let mut total = 0;
        for chunk in &chunks {
            prop_assert_eq!(chunk.bytes().last(), Some(&b'\n'));
            total += parse_records(chunk.bytes(), chunk.offset()).unwrap().total_count();
            rebuilt.extend_from_slice(chunk.bytes());
        }
        prop_assert_eq!(rebuilt, input);
        prop_assert_eq!(total, records.len() as u64);
    }

    #[test]
    fn prop_merge_order_irrelevant(
        records in records(),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
        rotate in any::<prop::sample::Index>(),
    ) {
        let whole = parse_records(&render(&records), 0).unwrap();

        let mut bounds: Vec<usize> = cuts.iter().map(|c| c.index(records.len() + 1)).collect();
        bounds.push(0);
        bounds.push(records.len());
        bounds.sort_unstable();

        let mut partials: Vec<AggregateTable> = bounds
            .windows(2)
            .map(|w| parse_records(&render(&records[w[0]..w[1]]), 0).unwrap())
            .collect();
        let shift = rotate.index(partials.len());
        partials.rotate_left(shift);

        let forward = partials.iter().cloned().fold(AggregateTable::new(), |mut acc, p| {
            acc.merge(p);
            acc
        });
        let backward = partials.into_iter().rev().fold(AggregateTable::new(), |mut acc, p| {
            acc.merge(p);
            acc
        });
        prop_assert_eq!(&forward, &whole);
        prop_assert_eq!(&backward, &whole);

        for (_, agg) in whole.iter() {
            let mean = agg.mean().unwrap();
            prop_assert!(agg.min().unwrap().to_f64() <= mean + 1e-9);
            prop_assert!(mean <= agg.max().unwrap().to_f64() + 1e-9);
        }
    }
}
