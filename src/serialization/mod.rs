//! Tagged-text model serialization (§4.7): `<multiboost>`/`<cascade>`
//! wrappers around a sequence of `<weakLearner>` blocks, with
//! `<stageSeparator>` markers breaking VJ-cascade output into stages.
//!
//! The reader is a stream tokenizer returning `(tag, value)` pairs; unknown
//! tags are skipped so older readers stay forward-compatible with newer
//! writers that add fields.
mod tokenizer;

use std::io::Write;

use crate::error::{BoostError, Result};
use crate::weak_learner::tree::{Child, Split, TreeNode};
use crate::weak_learner::{Hypothesis, WeakHypothesisKind};

use tokenizer::{Token, Tokenizer};

/// A VJ-cascade stage boundary: `<stageSeparator idx=.. nwhyp=.. thresh=..>`.
#[derive(Debug, Clone, PartialEq)]
pub struct StageMarker {
    pub idx: usize,
    pub n_weak_hyp: usize,
    pub threshold: f64,
}

/// Writes a full model: `<multiboost>` for a single ensemble, `<cascade>`
/// when `stages` is non-empty. Every numeric field is written at full
/// `f64` precision via `{:.17e}` so a reload reproduces the exact bits
/// (§8, "posterior produced by reloading equals... to full double
/// precision").
pub fn write_model(
    writer: &mut impl Write,
    ensemble: &[Hypothesis],
    stages: &[StageMarker],
) -> Result<()> {
    let cascade = !stages.is_empty();
    let root = if cascade { "cascade" } else { "multiboost" };
    writeln!(writer, "<{root}>")?;

    let mut stage_iter = stages.iter().peekable();
    for (i, hyp) in ensemble.iter().enumerate() {
        write_hypothesis(writer, hyp)?;
        while let Some(marker) = stage_iter.peek() {
            if marker.idx == i {
                writeln!(
                    writer,
                    "<stageSeparator idx={} nwhyp={} thresh={}/>",
                    marker.idx, marker.n_weak_hyp, fmt_f64(marker.threshold)
                )?;
                stage_iter.next();
            } else {
                break;
            }
        }
    }

    writeln!(writer, "</{root}>")?;
    Ok(())
}

/// Reads back whatever `write_model` wrote, tolerating unknown tags.
pub fn read_model(text: &str) -> Result<(Vec<Hypothesis>, Vec<StageMarker>)> {
    let mut tok = Tokenizer::new(text);
    let mut ensemble = Vec::new();
    let mut stages = Vec::new();

    let root = match tok.next() {
        Some(Token::Open(tag)) if tag == "multiboost" || tag == "cascade" => tag,
        other => return Err(BoostError::Malformed(format!("expected root tag, found {other:?}"))),
    };

    loop {
        match tok.peek() {
            Some(Token::Open(tag)) if tag == "weakLearner" => {
                ensemble.push(read_hypothesis(&mut tok)?);
            }
            Some(Token::SelfClosing(tag, attrs)) if tag == "stageSeparator" => {
                tok.next();
                stages.push(StageMarker {
                    idx: parse_attr(attrs, "idx")?,
                    n_weak_hyp: parse_attr(attrs, "nwhyp")?,
                    threshold: parse_attr(attrs, "thresh")?,
                });
            }
            Some(Token::Close(tag)) if *tag == root => {
                tok.next();
                break;
            }
            Some(_) => {
                tok.next();
            }
            None => return Err(BoostError::Malformed("unexpected end of model file".into())),
        }
    }

    Ok((ensemble, stages))
}

fn fmt_f64(v: f64) -> String {
    format!("{v:.17e}")
}

fn parse_attr<T: std::str::FromStr>(attrs: &str, key: &str) -> Result<T> {
    for pair in attrs.split_whitespace() {
        if let Some((k, v)) = pair.split_once('=') {
            if k == key {
                return v.parse().map_err(|_| {
                    BoostError::Malformed(format!("malformed attribute `{key}` in `{attrs}`"))
                });
            }
        }
    }
    Err(BoostError::Malformed(format!("missing attribute `{key}` in `{attrs}`")))
}

fn write_hypothesis(writer: &mut impl Write, hyp: &Hypothesis) -> Result<()> {
    writeln!(writer, "<weakLearner>")?;
    writeln!(writer, "<name>{}</name>", kind_name(&hyp.kind))?;
    writeln!(writer, "<alpha>{}</alpha>", fmt_f64(hyp.alpha))?;
    if let Some(t) = hyp.reject_threshold {
        writeln!(writer, "<threshold>{}</threshold>", fmt_f64(t))?;
    }
    write_kind(writer, &hyp.kind)?;
    writeln!(writer, "</weakLearner>")?;
    Ok(())
}

fn read_hypothesis(tok: &mut Tokenizer) -> Result<Hypothesis> {
    expect_open(tok, "weakLearner")?;
    let name = expect_scalar(tok, "name")?;
    let alpha: f64 = expect_scalar(tok, "alpha")?.parse()
        .map_err(|_| BoostError::Malformed("malformed <alpha>".into()))?;

    let mut reject_threshold = None;
    if matches!(tok.peek(), Some(Token::Scalar(t, _)) if t == "threshold") {
        let v = expect_scalar(tok, "threshold")?;
        reject_threshold = Some(v.parse()
            .map_err(|_| BoostError::Malformed("malformed <threshold>".into()))?);
    }

    let kind = read_kind(tok, &name)?;
    expect_close(tok, "weakLearner")?;

    Ok(Hypothesis { alpha, kind, reject_threshold })
}

fn kind_name(kind: &WeakHypothesisKind) -> &'static str {
    match kind {
        WeakHypothesisKind::Constant { .. } => "Constant",
        WeakHypothesisKind::Stump { .. } => "Stump",
        WeakHypothesisKind::Selector { .. } => "Selector",
        WeakHypothesisKind::OneClass { .. } => "OneClass",
        WeakHypothesisKind::Tree(_) => "Tree",
        WeakHypothesisKind::Product(_) => "Product",
        WeakHypothesisKind::Haar { .. } => "Haar",
        WeakHypothesisKind::Bandit(_) => "Bandit",
    }
}

fn write_floats(writer: &mut impl Write, tag: &str, values: &[f64]) -> Result<()> {
    let joined = values.iter().map(|v| fmt_f64(*v)).collect::<Vec<_>>().join(",");
    writeln!(writer, "<{tag}>{joined}</{tag}>")?;
    Ok(())
}

fn parse_floats(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(|tok| tok.parse::<f64>().map_err(|_| BoostError::Malformed(format!("malformed float list `{s}`"))))
        .collect()
}

fn write_kind(writer: &mut impl Write, kind: &WeakHypothesisKind) -> Result<()> {
    match kind {
        WeakHypothesisKind::Constant { polarity } => {
            write_floats(writer, "polarity", polarity)?;
        }
        WeakHypothesisKind::Stump { feature, threshold, polarity } => {
            writeln!(writer, "<feature>{feature}</feature>")?;
            writeln!(writer, "<cut>{}</cut>", fmt_f64(*threshold))?;
            write_floats(writer, "polarity", polarity)?;
        }
        WeakHypothesisKind::Selector { feature, thresholds, polarity } => {
            writeln!(writer, "<feature>{feature}</feature>")?;
            write_floats(writer, "cuts", thresholds)?;
            write_floats(writer, "polarity", polarity)?;
        }
        WeakHypothesisKind::OneClass { feature, threshold, target_class, polarity } => {
            writeln!(writer, "<feature>{feature}</feature>")?;
            writeln!(writer, "<cut>{}</cut>", fmt_f64(*threshold))?;
            writeln!(writer, "<targetClass>{target_class}</targetClass>")?;
            write_floats(writer, "polarity", polarity)?;
        }
        WeakHypothesisKind::Haar { feature_a, feature_b, threshold, polarity } => {
            writeln!(writer, "<featureA>{feature_a}</featureA>")?;
            writeln!(writer, "<featureB>{feature_b}</featureB>")?;
            writeln!(writer, "<cut>{}</cut>", fmt_f64(*threshold))?;
            write_floats(writer, "polarity", polarity)?;
        }
        WeakHypothesisKind::Product(children) => {
            writeln!(writer, "<children>")?;
            for child in children {
                writeln!(writer, "<child>")?;
                writeln!(writer, "<name>{}</name>", kind_name(child))?;
                write_kind(writer, child)?;
                writeln!(writer, "</child>")?;
            }
            writeln!(writer, "</children>")?;
        }
        WeakHypothesisKind::Bandit(inner) => {
            writeln!(writer, "<inner>")?;
            writeln!(writer, "<name>{}</name>", kind_name(inner))?;
            write_kind(writer, inner)?;
            writeln!(writer, "</inner>")?;
        }
        WeakHypothesisKind::Tree(nodes) => {
            writeln!(writer, "<nodes count=\"{}\">", nodes.len())?;
            for node in nodes {
                writeln!(writer, "<node>")?;
                writeln!(writer, "<feature>{}</feature>", node.split.feature)?;
                writeln!(writer, "<cut>{}</cut>", fmt_f64(node.split.threshold))?;
                write_child(writer, "left", &node.left)?;
                write_child(writer, "right", &node.right)?;
                writeln!(writer, "</node>")?;
            }
            writeln!(writer, "</nodes>")?;
        }
    }
    Ok(())
}

fn write_child(writer: &mut impl Write, tag: &str, child: &Child) -> Result<()> {
    match child {
        Child::Node(idx) => writeln!(writer, "<{tag} ref=\"{idx}\"/>")?,
        Child::Leaf(kind) => {
            writeln!(writer, "<{tag}>")?;
            writeln!(writer, "<name>{}</name>", kind_name(kind))?;
            write_kind(writer, kind)?;
            writeln!(writer, "</{tag}>")?;
        }
    }
    Ok(())
}

fn read_kind(tok: &mut Tokenizer, name: &str) -> Result<WeakHypothesisKind> {
    match name {
        "Constant" => Ok(WeakHypothesisKind::Constant { polarity: parse_floats(&expect_scalar(tok, "polarity")?)? }),
        "Stump" => {
            let feature = expect_scalar(tok, "feature")?.parse().map_err(bad("feature"))?;
            let threshold = expect_scalar(tok, "cut")?.parse().map_err(bad("cut"))?;
            let polarity = parse_floats(&expect_scalar(tok, "polarity")?)?;
            Ok(WeakHypothesisKind::Stump { feature, threshold, polarity })
        }
        "Selector" => {
            let feature = expect_scalar(tok, "feature")?.parse().map_err(bad("feature"))?;
            let thresholds = parse_floats(&expect_scalar(tok, "cuts")?)?;
            let polarity = parse_floats(&expect_scalar(tok, "polarity")?)?;
            Ok(WeakHypothesisKind::Selector { feature, thresholds, polarity })
        }
        "OneClass" => {
            let feature = expect_scalar(tok, "feature")?.parse().map_err(bad("feature"))?;
            let threshold = expect_scalar(tok, "cut")?.parse().map_err(bad("cut"))?;
            let target_class = expect_scalar(tok, "targetClass")?.parse().map_err(bad("targetClass"))?;
            let polarity = parse_floats(&expect_scalar(tok, "polarity")?)?;
            Ok(WeakHypothesisKind::OneClass { feature, threshold, target_class, polarity })
        }
        "Haar" => {
            let feature_a = expect_scalar(tok, "featureA")?.parse().map_err(bad("featureA"))?;
            let feature_b = expect_scalar(tok, "featureB")?.parse().map_err(bad("featureB"))?;
            let threshold = expect_scalar(tok, "cut")?.parse().map_err(bad("cut"))?;
            let polarity = parse_floats(&expect_scalar(tok, "polarity")?)?;
            Ok(WeakHypothesisKind::Haar { feature_a, feature_b, threshold, polarity })
        }
        "Product" => {
            expect_open(tok, "children")?;
            let mut children = Vec::new();
            while matches!(tok.peek(), Some(Token::Open(t)) if t == "child") {
                expect_open(tok, "child")?;
                let child_name = expect_scalar(tok, "name")?;
                children.push(read_kind(tok, &child_name)?);
                expect_close(tok, "child")?;
            }
            expect_close(tok, "children")?;
            Ok(WeakHypothesisKind::Product(children))
        }
        "Bandit" => {
            expect_open(tok, "inner")?;
            let inner_name = expect_scalar(tok, "name")?;
            let inner = read_kind(tok, &inner_name)?;
            expect_close(tok, "inner")?;
            Ok(WeakHypothesisKind::Bandit(Box::new(inner)))
        }
        "Tree" => {
            let Some(Token::OpenWithAttrs(tag, _attrs)) = tok.next() else {
                return Err(BoostError::Malformed("expected <nodes count=..>".into()));
            };
            if tag != "nodes" {
                return Err(BoostError::Malformed(format!("expected <nodes>, found <{tag}>")));
            }
            let mut nodes = Vec::new();
            while matches!(tok.peek(), Some(Token::Open(t)) if t == "node") {
                expect_open(tok, "node")?;
                let feature = expect_scalar(tok, "feature")?.parse().map_err(bad("feature"))?;
                let threshold = expect_scalar(tok, "cut")?.parse().map_err(bad("cut"))?;
                let left = read_child(tok, "left")?;
                let right = read_child(tok, "right")?;
                expect_close(tok, "node")?;
                nodes.push(TreeNode { split: Split { feature, threshold }, left, right });
            }
            expect_close(tok, "nodes")?;
            Ok(WeakHypothesisKind::Tree(nodes))
        }
        other => Err(BoostError::UnknownWeakLearner(other.to_string())),
    }
}

fn read_child(tok: &mut Tokenizer, tag: &str) -> Result<Child> {
    match tok.next() {
        Some(Token::SelfClosingRef(t, idx)) if t == tag => Ok(Child::Node(idx)),
        Some(Token::Open(t)) if t == tag => {
            let name = expect_scalar(tok, "name")?;
            let kind = read_kind(tok, &name)?;
            expect_close(tok, tag)?;
            Ok(Child::Leaf(Box::new(kind)))
        }
        other => Err(BoostError::Malformed(format!("expected <{tag}>, found {other:?}"))),
    }
}

fn bad(field: &'static str) -> impl Fn(std::num::ParseFloatError) -> BoostError + '_ {
    move |_| BoostError::Malformed(format!("malformed <{field}>"))
}

fn expect_open(tok: &mut Tokenizer, tag: &str) -> Result<()> {
    match tok.next() {
        Some(Token::Open(t)) if t == tag => Ok(()),
        other => Err(BoostError::Malformed(format!("expected <{tag}>, found {other:?}"))),
    }
}

fn expect_close(tok: &mut Tokenizer, tag: &str) -> Result<()> {
    match tok.next() {
        Some(Token::Close(t)) if t == tag => Ok(()),
        other => Err(BoostError::Malformed(format!("expected </{tag}>, found {other:?}"))),
    }
}

fn expect_scalar(tok: &mut Tokenizer, tag: &str) -> Result<String> {
    match tok.next() {
        Some(Token::Scalar(t, v)) if t == tag => Ok(v),
        other => Err(BoostError::Malformed(format!("expected <{tag}>..</{tag}>, found {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weak_learner::Hypothesis;

    #[test]
    fn stump_round_trips() {
        let hyp = Hypothesis::new(1.23456789, WeakHypothesisKind::Stump {
            feature: 2,
            threshold: 0.5,
            polarity: vec![1.0, -1.0, 1.0],
        });
        let mut buf = Vec::new();
        write_model(&mut buf, std::slice::from_ref(&hyp), &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let (ensemble, stages) = read_model(&text).unwrap();
        assert!(stages.is_empty());
        assert_eq!(ensemble.len(), 1);
        assert!((ensemble[0].alpha - hyp.alpha).abs() < 1e-12);
        match &ensemble[0].kind {
            WeakHypothesisKind::Stump { feature, threshold, polarity } => {
                assert_eq!(*feature, 2);
                assert!((threshold - 0.5).abs() < 1e-12);
                assert_eq!(polarity, &vec![1.0, -1.0, 1.0]);
            }
            other => panic!("expected Stump, got {other:?}"),
        }
    }

    #[test]
    fn cascade_stage_separators_round_trip() {
        let ensemble = vec![
            Hypothesis::new(0.1, WeakHypothesisKind::Constant { polarity: vec![1.0] }),
            Hypothesis::new(0.2, WeakHypothesisKind::Constant { polarity: vec![-1.0] }),
        ];
        let stages = vec![StageMarker { idx: 0, n_weak_hyp: 1, threshold: 0.25 }];
        let mut buf = Vec::new();
        write_model(&mut buf, &ensemble, &stages).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("<cascade>"));

        let (read_ensemble, read_stages) = read_model(&text).unwrap();
        assert_eq!(read_ensemble.len(), 2);
        assert_eq!(read_stages, stages);
    }

    #[test]
    fn unknown_tag_is_skipped() {
        let text = "<multiboost>\n<futureFeature>42</futureFeature>\n</multiboost>\n";
        let (ensemble, stages) = read_model(text).unwrap();
        assert!(ensemble.is_empty());
        assert!(stages.is_empty());
    }
}
