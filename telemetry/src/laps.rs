//! Reading the lap feed CSV.

use anyhow::Context;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use stint_core::LapRecord;

/// Read an ordered lap feed from a CSV file.
pub fn read_laps(path: &Path) -> anyhow::Result<Vec<LapRecord>> {
    let file =
        File::open(path).with_context(|| format!("opening lap feed {}", path.display()))?;
    read_laps_from(BufReader::new(file))
        .with_context(|| format!("parsing lap feed {}", path.display()))
}

/// Read an ordered lap feed from any reader (headers required).
pub fn read_laps_from<R: Read>(reader: R) -> anyhow::Result<Vec<LapRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut laps = Vec::new();
    for row in csv_reader.deserialize() {
        let lap: LapRecord = row?;
        laps.push(lap);
    }
    Ok(laps)
}

/// Write a lap feed in the same CSV format the extraction step produces.
/// Used to persist synthetic sessions.
pub fn write_laps_csv(path: &Path, laps: &[LapRecord]) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut csv_writer = csv::Writer::from_writer(std::io::BufWriter::new(file));
    for lap in laps {
        csv_writer.serialize(lap)?;
    }
    csv_writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use stint_core::{Compound, StintId};

    const FEED: &str = "\
LapNumber,Stint,Compound,TyreLife,TrackTemp,LapTime_Sec,Degradation_Delta
3,1,MEDIUM,3,34.2,107.345,0.0
4,1,MEDIUM,4,34.0,107.512,0.167
13,2,HARD,1,33.1,106.901,0.0
";

    #[test]
    fn parses_the_feed_header_exactly() {
        let laps = read_laps_from(FEED.as_bytes()).unwrap();
        assert_eq!(laps.len(), 3);
        assert_eq!(laps[0].lap_number, 3);
        assert_eq!(laps[0].stint_id, StintId(1));
        assert_eq!(laps[0].compound, Compound::Medium);
        assert_eq!(laps[2].compound, Compound::Hard);
        assert!((laps[1].degradation_delta - 0.167).abs() < 1e-12);
        assert!((laps[2].track_temp - 33.1).abs() < 1e-12);
    }

    #[test]
    fn unknown_compound_is_a_parse_error() {
        let feed = "\
LapNumber,Stint,Compound,TyreLife,TrackTemp,LapTime_Sec,Degradation_Delta
1,1,SUPERSOFT,1,30.0,100.0,0.0
";
        assert!(read_laps_from(feed.as_bytes()).is_err());
    }

    #[test]
    fn empty_feed_parses_to_no_laps() {
        let feed = "LapNumber,Stint,Compound,TyreLife,TrackTemp,LapTime_Sec,Degradation_Delta\n";
        assert!(read_laps_from(feed.as_bytes()).unwrap().is_empty());
    }
}
