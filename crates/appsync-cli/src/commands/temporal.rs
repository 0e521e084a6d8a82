use anyhow::Result;
use appsync_core::{AwsDate, AwsDateTime, AwsTime, AwsTimeZone};

use crate::cli::{TemporalArgs, TemporalKind};
use crate::output::print_field;

pub fn run(args: &TemporalArgs) -> Result<()> {
    let (normalized, epoch_millis, zone) = match args.kind {
        TemporalKind::Date => {
            let value = AwsDate::parse(&args.value)?;
            (value.to_string(), value.epoch_millis(), value.time_zone().clone())
        }
        TemporalKind::Time => {
            let value = AwsTime::parse(&args.value)?;
            (value.to_string(), value.epoch_millis(), value.time_zone().clone())
        }
        TemporalKind::DateTime => {
            let value = AwsDateTime::parse(&args.value)?;
            (value.to_string(), value.epoch_millis(), value.time_zone().clone())
        }
    };
    print_zone(&normalized, epoch_millis, &zone);
    Ok(())
}

fn print_zone(normalized: &str, epoch_millis: i64, zone: &AwsTimeZone) {
    print_field("Value", normalized);
    print_field("Epoch millis", &epoch_millis.to_string());
    print_field("Time zone", zone.id());
    print_field("Offset millis", &zone.raw_offset_millis().to_string());
}
