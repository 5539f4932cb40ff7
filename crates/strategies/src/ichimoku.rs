use crate::base::assemble;
use crate::error::StrategyError;
use crate::indicators::ichimoku;
use crate::params::StrategyParams;
use crate::Strategy;
use configuration::IchimokuParams;
use core_types::{PriceSeries, Signal, SignalSeries, StrategyId};

/// The Ichimoku Kinko Hyo strategy.
///
/// A long signal requires every bullish condition at once:
/// 1. Close above the Kumo (both Senkou spans).
/// 2. Tenkan-sen above Kijun-sen.
/// 3. Chikou span above the current close.
///
/// Shorts require the mirror image. The Chikou comparison reads the close
/// `displacement` bars ahead, so the last `displacement` bars are always flat.
///
/// Period ordering (`tenkan < kijun < senkou_span_b`) is left to the caller; the
/// optimizer prunes disordered combinations before they reach this type.
#[derive(Debug, Clone)]
pub struct Ichimoku {
    params: IchimokuParams,
}

impl Ichimoku {
    pub fn new(params: IchimokuParams) -> Result<Self, StrategyError> {
        if params.tenkan_period == 0 || params.kijun_period == 0 || params.senkou_span_b_period == 0 {
            return Err(StrategyError::InvalidParameters(
                "Ichimoku periods cannot be zero".to_string(),
            ));
        }

        Ok(Self { params })
    }
}

impl Strategy for Ichimoku {
    fn id(&self) -> StrategyId {
        StrategyId::Ichimoku
    }

    fn params(&self) -> StrategyParams {
        StrategyParams::Ichimoku(self.params)
    }

    fn warmup(&self) -> usize {
        let p = &self.params;
        p.tenkan_period.max(p.kijun_period).max(p.senkou_span_b_period) - 1
    }

    fn generate_signals(&self, series: &PriceSeries) -> Result<SignalSeries, StrategyError> {
        let closes = series.closes();
        let lines = ichimoku(
            &series.highs(),
            &series.lows(),
            &closes,
            self.params.tenkan_period,
            self.params.kijun_period,
            self.params.senkou_span_b_period,
            self.params.displacement,
        )?;

        let signals: Vec<Signal> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let bullish = close > lines.senkou_a[i]
                    && close > lines.senkou_b[i]
                    && lines.tenkan[i] > lines.kijun[i]
                    && lines.chikou[i] > close;
                let bearish = close < lines.senkou_a[i]
                    && close < lines.senkou_b[i]
                    && lines.tenkan[i] < lines.kijun[i]
                    && lines.chikou[i] < close;

                if bullish {
                    Signal::Long
                } else if bearish {
                    Signal::Short
                } else {
                    Signal::Flat
                }
            })
            .collect();

        tracing::debug!(
            symbol = series.symbol(),
            tenkan = self.params.tenkan_period,
            kijun = self.params.kijun_period,
            senkou_b = self.params.senkou_span_b_period,
            displacement = self.params.displacement,
            "Ichimoku: signals generated"
        );

        assemble(series, signals, self.warmup())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_support::{series_from_closes, wave_series};

    fn strategy(tenkan: usize, kijun: usize, senkou_b: usize, displacement: usize) -> Ichimoku {
        Ichimoku::new(IchimokuParams {
            tenkan_period: tenkan,
            kijun_period: kijun,
            senkou_span_b_period: senkou_b,
            displacement,
        })
        .unwrap()
    }

    #[test]
    fn steady_uptrend_is_long_once_warmed_up() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = strategy(2, 4, 8, 3).generate_signals(&series_from_closes(&closes)).unwrap();
        let signals = out.signals();

        assert!(signals[..7].iter().all(|s| s.is_flat()));
        assert!(signals[7..37].iter().all(|&s| s == Signal::Long));
        // No future close exists to compare against.
        assert!(signals[37..].iter().all(|s| s.is_flat()));
    }

    #[test]
    fn steady_downtrend_is_short() {
        let closes: Vec<f64> = (0..40).map(|i| 200.0 - i as f64).collect();
        let out = strategy(2, 4, 8, 3).generate_signals(&series_from_closes(&closes)).unwrap();
        assert!(out.signals()[7..37].iter().all(|&s| s == Signal::Short));
    }

    #[test]
    fn lengths_match_input() {
        let series = wave_series(300);
        let out = strategy(9, 26, 52, 26).generate_signals(&series).unwrap();
        assert_eq!(out.len(), series.len());
        assert_eq!(out.warmup(), 51);
    }
}
