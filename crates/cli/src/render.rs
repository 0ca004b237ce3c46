//! Plain-text panels for the terminal.

use aiwatch_core::domain::enhanced::{NewsAndSocial, NewsSentiment, Sector, StockMetrics};
use aiwatch_core::domain::stock::{StockAnalysis, StockRecord};
use aiwatch_core::view::chart::{rank_sectors, Band, ChartMetric, ChartPoint};
use aiwatch_core::view::format;
use aiwatch_core::view::portfolio::{PortfolioMetrics, PurchasePlan};
use std::collections::BTreeMap;
use std::fmt::Write as _;

const BAR_WIDTH: usize = 40;

pub fn stock_table(stocks: &[&StockRecord]) -> String {
    let mut out = format!(
        "{:<6} {:<28} {:>10} {:>8} {:>5} {:>6} {:>5} {:<11} {:>8}\n",
        "SYMBOL", "NAME", "PRICE", "CHANGE", "AI", "GROWTH", "RISK", "SIGNAL", "P/E"
    );
    for s in stocks {
        let change = s
            .price_change_percent()
            .map_or_else(|| format::NOT_AVAILABLE.to_string(), format::signed_percent);
        let _ = writeln!(
            out,
            "{:<6} {:<28} {:>10} {:>8} {:>5} {:>6} {:>5} {:<11} {:>8}",
            s.symbol,
            truncate(&s.name, 28),
            format::price(s.price),
            change,
            format::score(s.ai_score),
            format::score(s.growth_score),
            format::score(s.risk_score),
            s.recommendation.label(),
            format::ratio(s.pe_ratio),
        );
    }
    out
}

pub fn stock_detail(s: &StockRecord) -> String {
    let mut out = format!("{} ({})\n", s.name, s.symbol);
    let _ = writeln!(out, "  Sector:        {}", s.sector.as_deref().unwrap_or(format::NOT_AVAILABLE));
    let _ = writeln!(out, "  Market cap:    {}", format::market_cap_billions(s.market_cap));
    let _ = writeln!(out, "  52w range:     {} - {}", format::optional_price(s.year_low), format::optional_price(s.year_high));
    let _ = writeln!(out, "  Volume:        {}", format::volume_millions(s.volume as f64));
    let _ = writeln!(out, "  Predicted:     {}", format::price(s.predicted_price));
    if let Some(view) = &s.analyst_view {
        let _ = writeln!(out, "  Analyst view:  {view}");
    }
    out
}

pub fn analysis_panel(a: &StockAnalysis) -> String {
    let t = &a.technical_indicators;
    let mut out = format!("Technical analysis: {}\n", a.symbol);
    let _ = writeln!(out, "  RSI:           {:.2}", t.rsi);
    let _ = writeln!(out, "  MACD:          {}", format::signed(t.macd));
    let _ = writeln!(out, "  MA 50 / 200:   {} / {}", format::price(t.moving_average_50), format::price(t.moving_average_200));
    let _ = writeln!(out, "  Sentiment:     {:.0}/100", a.sentiment_score);
    let _ = writeln!(out, "  Opportunity:   {}", a.buying_opportunity);
    let _ = writeln!(out, "  Risk level:    {}", a.risk_level);
    let _ = writeln!(
        out,
        "  Targets:       low {}  avg {}  high {}",
        format::price(a.price_targets.low),
        format::price(a.price_targets.medium),
        format::price(a.price_targets.high)
    );
    out
}

pub fn metrics_panel(symbol: &str, m: &StockMetrics) -> String {
    let t = &m.technical_indicators;
    let mut out = format!("Enhanced metrics: {symbol}\n");
    let _ = writeln!(out, "Technicals");
    let _ = writeln!(out, "  RSI {:.2}  MACD {}", t.rsi, format::signed(t.macd));
    let _ = writeln!(
        out,
        "  Bollinger {} / {} / {}",
        format::price(t.bollinger_bands.upper),
        format::price(t.bollinger_bands.middle),
        format::price(t.bollinger_bands.lower)
    );
    let _ = writeln!(
        out,
        "  Volume {} (avg {}, {})",
        format::volume_millions(t.volume.current),
        format::volume_millions(t.volume.average),
        format::signed_percent(t.volume.change)
    );

    let d = &m.dividend_info;
    let _ = writeln!(out, "Dividends");
    let _ = writeln!(
        out,
        "  Yield {:.2}%  Annual {}  Payout {:.2}%  Next {}",
        d.dividend_yield,
        format::price(d.annual_dividend),
        d.payout_ratio,
        d.next_dividend_date.format("%Y-%m-%d")
    );

    let o = &m.institutional_ownership;
    let _ = writeln!(out, "Institutional ownership {:.2}% of {} shares", o.percentage, format::grouped(o.total_shares));
    for h in &o.top_holders {
        let _ = writeln!(out, "  {:<16} {:>12} {:>6.2}%", h.name, format::grouped(h.shares), h.percentage);
    }

    let e = &m.earnings_info;
    let _ = writeln!(out, "Earnings");
    let _ = writeln!(
        out,
        "  Next {}  Est EPS {}  Actual {}  Surprise {}",
        e.next_earnings_date.format("%Y-%m-%d"),
        format::price(e.estimated_eps),
        format::optional_price(e.actual_eps),
        e.surprise.map_or_else(|| format::NOT_AVAILABLE.to_string(), format::signed_percent)
    );

    let _ = writeln!(out, "Competitors");
    for c in &m.competitors {
        let _ = writeln!(
            out,
            "  {:<6} {:<18} share {:>5.1}%  AI {}  growth {}  risk {}",
            c.symbol,
            c.name,
            c.market_share,
            format::score(c.comparison.ai_score),
            format::score(c.comparison.growth_score),
            format::score(c.comparison.risk_score)
        );
    }
    out
}

pub fn news_panel(n: &NewsAndSocial) -> String {
    let mut out = String::from("News\n");
    for item in &n.news {
        let _ = writeln!(
            out,
            "  [{}] {} ({}, {})",
            item.date.format("%Y-%m-%d"),
            item.title,
            item.source,
            sentiment_label(item.sentiment)
        );
    }
    let s = &n.social_sentiment;
    let _ = writeln!(out, "Social sentiment (overall {})", format::signed(s.overall));
    for (platform, p) in [("Twitter", &s.twitter), ("Reddit", &s.reddit)] {
        let _ = writeln!(
            out,
            "  {:<8} {}  {} mentions{}",
            platform,
            format::signed(p.sentiment),
            format::grouped(p.volume),
            if p.trending { "  trending" } else { "" }
        );
    }
    out
}

pub fn purchase_table(plan: &PurchasePlan) -> String {
    let mut out = format!("Investment amount: {}\n", format::price(plan.amount));
    let _ = writeln!(out, "{:<6} {:>10} {:>5} {:>7} {:>12} {:>10}", "SYMBOL", "PRICE", "AI", "SHARES", "VALUE", "LEFT");
    for r in &plan.rows {
        let _ = writeln!(
            out,
            "{:<6} {:>10} {:>5} {:>7} {:>12} {:>10}",
            r.symbol,
            format::price(r.price),
            format::score(r.ai_score),
            r.shares,
            format::price(r.value),
            format::price(r.remaining)
        );
    }
    out
}

pub fn chart(metric: ChartMetric, points: &[ChartPoint]) -> String {
    let max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    let mut out = format!("{}\n", metric.label());
    for p in points {
        let len = if max > 0.0 {
            ((p.value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let marker = match p.band {
            Band::Good => '#',
            Band::Fair => '=',
            Band::Poor => '-',
        };
        let _ = writeln!(out, "{:<6} {:<width$} {:.2}", p.symbol, marker.to_string().repeat(len), p.value, width = BAR_WIDTH);
    }
    out
}

pub fn sectors_panel(sectors: &[Sector], counts: &BTreeMap<String, usize>) -> String {
    let mut out = String::from("Sector performance\n");
    for (s, tier) in rank_sectors(sectors) {
        let _ = writeln!(
            out,
            "  {:<12} {:>7}  {:?}  top: {}",
            s.name,
            format::signed_percent(s.performance),
            tier,
            s.top_stocks.join(", ")
        );
    }
    let _ = writeln!(out, "Watchlist by sector");
    for (sector, n) in counts {
        let _ = writeln!(out, "  {sector:<24} {n}");
    }
    out
}

pub fn portfolio_panel(m: &PortfolioMetrics) -> String {
    let avg = |v: Option<f64>| v.map_or_else(|| format::NOT_AVAILABLE.to_string(), format::score);
    let mut out = format!("Portfolio ({} stocks)\n", m.count);
    let _ = writeln!(out, "  Total value:   {}", format::price(m.total_value));
    let _ = writeln!(out, "  Avg AI:        {}", avg(m.average_ai));
    let _ = writeln!(out, "  Avg growth:    {}", avg(m.average_growth));
    let _ = writeln!(out, "  Avg risk:      {}", avg(m.average_risk));
    let _ = writeln!(
        out,
        "  Risk level:    {}",
        m.risk_level.map_or_else(|| format::NOT_AVAILABLE.to_string(), |r| r.to_string())
    );
    out
}

fn sentiment_label(s: NewsSentiment) -> &'static str {
    match s {
        NewsSentiment::Positive => "positive",
        NewsSentiment::Negative => "negative",
        NewsSentiment::Neutral => "neutral",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
    t.push('~');
    t
}
