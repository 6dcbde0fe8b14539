//! Human-readable rendering of analysis results.

use std::fmt;

use crate::analyzer::{DistributionResult, QualityBand};

impl fmt::Display for QualityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Excellent => "EXCELLENT",
            Self::VeryGood => "VERY GOOD",
            Self::Good => "GOOD",
            Self::Regular => "REGULAR",
            Self::Poor => "POOR",
        })
    }
}

impl fmt::Display for DistributionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.algorithm)?;
        writeln!(
            f,
            "Keys: {}  Expected per shard: {:.2}",
            self.total_keys,
            self.expected()
        )?;

        for (shard, count) in &self.per_shard {
            writeln!(
                f,
                "  {shard:<12} {count:>8} keys ({:>6.2}%)  deviation {:.2}",
                self.percentage(shard),
                self.deviation(shard),
            )?;
        }

        writeln!(f, "Standard deviation: {:.2}", self.std_dev)?;
        writeln!(f, "Variance:           {:.2}", self.variance)?;
        writeln!(f, "Max deviation:      {:.2}", self.max_deviation)?;
        writeln!(f, "Min deviation:      {:.2}", self.min_deviation)?;
        writeln!(f, "Elapsed:            {:?}", self.elapsed)?;
        write!(
            f,
            "Quality:            {} ({:.2}% average deviation)",
            self.quality, self.average_deviation_percent
        )
    }
}
