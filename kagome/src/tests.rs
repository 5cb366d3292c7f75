//! End-to-end tests over the miniature dictionary and the fallback.

use std::sync::Arc;

use crate::test_utils::{entry_id, ipa_mini_dict};
use crate::tokenizer::lattice::NodeClass;
use crate::{Dict, Mode, Tokenizer, Worker};

fn worker(mode: Mode) -> Worker {
    Tokenizer::new(Arc::new(ipa_mini_dict())).mode(mode).new_worker()
}

fn surfaces(worker: &Worker) -> Vec<String> {
    worker.token_iter().map(|t| t.surface().to_string()).collect()
}

#[test]
fn test_sumomo_single_word() {
    let mut worker = worker(Mode::Normal);
    worker.reset_sentence("すもも");
    worker.tokenize();

    assert_eq!(worker.num_tokens(), 1);
    let t = worker.token(0);
    assert_eq!(t.surface(), "すもも");
    assert_eq!(t.class(), NodeClass::Known);
    assert_eq!(t.pos()[0], "名詞");
    assert_eq!(t.base_form(), "すもも");
    assert_eq!(t.reading(), "スモモ");
    assert_eq!(t.pronunciation(), "スモモ");
}

#[test]
fn test_sumomo_sentence_canonical_analysis() {
    let input = "すもももももももものうち";
    let mut worker = worker(Mode::Normal);
    worker.reset_sentence(input);
    worker.tokenize();

    assert_eq!(
        surfaces(&worker),
        vec!["すもも", "も", "もも", "も", "もも", "の", "うち"]
    );

    let expected_pos = ["名詞", "助詞", "名詞", "助詞", "名詞", "助詞", "名詞"];
    for (i, pos) in expected_pos.iter().enumerate() {
        assert_eq!(worker.token(i).pos()[0], *pos, "token {i}");
    }
}

#[test]
fn test_segmentation_covers_input_contiguously() {
    let input = "すもももももももものうち";
    let mut worker = worker(Mode::Normal);
    worker.reset_sentence(input);
    worker.tokenize();

    let mut byte_pos = 0;
    let mut char_pos = 0;
    for t in worker.token_iter() {
        assert_eq!(t.position(), byte_pos);
        assert_eq!(t.char_start(), char_pos);
        assert_eq!(
            t.surface(),
            &input[t.position()..t.position() + t.surface().len()]
        );
        byte_pos += t.surface().len();
        char_pos = t.char_end();
    }
    assert_eq!(byte_pos, input.len());
    assert_eq!(char_pos, input.chars().count());
}

#[test]
fn test_accumulated_cost_matches_step_costs() {
    let input = "すもももももももものうち";
    let mut worker = worker(Mode::Normal);
    worker.reset_sentence(input);
    worker.tokenize();

    let dict = ipa_mini_dict();
    let mut cost = 0i64;
    let mut prev_right = 0i16;
    for t in worker.token_iter() {
        let morph = dict.morph(t.id());
        cost += i64::from(dict.connection(prev_right, morph.left_id)) + i64::from(morph.weight);
        assert_eq!(i64::from(t.total_cost()), cost);
        prev_right = morph.right_id;
    }
    // The EOS edge closes the path with a zero-weight sentinel.
    assert_eq!(dict.connection(prev_right, 0), 0);
}

#[test]
fn test_compound_noun_normal_vs_search() {
    let input = "関西国際空港";

    let mut normal = worker(Mode::Normal);
    normal.reset_sentence(input);
    normal.tokenize();
    assert_eq!(surfaces(&normal), vec!["関西国際空港"]);

    let mut search = worker(Mode::Search);
    search.reset_sentence(input);
    search.tokenize();
    assert_eq!(surfaces(&search), vec!["関西", "国際", "空港"]);
}

#[test]
fn test_extended_splits_unknown_katakana_run() {
    let input = "デジカメを買った";
    let mut worker = worker(Mode::Extended);
    worker.reset_sentence(input);
    worker.tokenize();

    assert_eq!(
        surfaces(&worker),
        vec!["デ", "ジ", "カ", "メ", "を", "買っ", "た"]
    );
    for i in 0..4 {
        assert_eq!(worker.token(i).class(), NodeClass::Dummy);
        assert_eq!(worker.token(i).char_start(), i);
        assert_eq!(worker.token(i).char_end(), i + 1);
    }
    assert_eq!(worker.token(4).class(), NodeClass::Known);
    assert_eq!(worker.token(5).class(), NodeClass::Known);
    assert_eq!(worker.token(5).base_form(), "買う");
    assert_eq!(worker.token(6).class(), NodeClass::Known);
}

#[test]
fn test_normal_keeps_unknown_katakana_run_whole() {
    let mut worker = worker(Mode::Normal);
    worker.reset_sentence("デジカメを買った");
    worker.tokenize();

    assert_eq!(surfaces(&worker), vec!["デジカメ", "を", "買っ", "た"]);
    assert_eq!(worker.token(0).class(), NodeClass::Unknown);
}

#[test]
fn test_unknown_generated_alongside_known_matches() {
    // Katakana carries the invoke flag, so unknown candidates compete even
    // where the lexicon matched; with the fallback unknown weights the
    // unknown candidate wins, which is how the flag becomes observable.
    let mut worker = worker(Mode::Normal);
    worker.reset_sentence("カメ");
    worker.tokenize();

    assert_eq!(worker.num_tokens(), 1);
    assert_eq!(worker.token(0).surface(), "カメ");
    assert_eq!(worker.token(0).class(), NodeClass::Unknown);
}

#[test]
fn test_empty_input() {
    let mut worker = worker(Mode::Normal);
    worker.reset_sentence("");
    worker.tokenize();
    assert_eq!(worker.num_tokens(), 0);
}

#[test]
fn test_determinism_across_runs() {
    let input = "すもももももももものうちデジカメ関西国際空港";
    for mode in [Mode::Normal, Mode::Search, Mode::Extended] {
        let mut a = worker(mode);
        a.reset_sentence(input);
        a.tokenize();
        let mut b = worker(mode);
        b.reset_sentence(input);
        b.tokenize();

        assert_eq!(a.num_tokens(), b.num_tokens());
        for (x, y) in a.token_iter().zip(b.token_iter()) {
            assert!(x == y);
            assert_eq!(x.position(), y.position());
        }
    }
}

#[test]
fn test_surface_invariant_across_modes() {
    let inputs = [
        "すもももももももものうち",
        "関西国際空港",
        "デジカメを買った",
        "カメもうち",
    ];
    for input in inputs {
        for mode in [Mode::Normal, Mode::Search, Mode::Extended] {
            let mut w = worker(mode);
            w.reset_sentence(input);
            w.tokenize();
            let mut collected = String::new();
            for t in w.token_iter() {
                assert_eq!(
                    t.surface().as_bytes(),
                    &input.as_bytes()[t.position()..t.position() + t.surface().len()]
                );
                collected.push_str(t.surface());
            }
            assert_eq!(collected, input, "mode {mode:?}");
        }
    }
}

#[test]
fn test_wakati_roundtrip() {
    let tokenizer = Tokenizer::new(Arc::new(ipa_mini_dict()));
    let input = "すもももももももものうち";
    let pieces = tokenizer.wakati(input);
    assert_eq!(pieces.concat(), input);
    assert_eq!(pieces.len(), 7);
}

#[test]
fn test_token_equality_semantics() {
    let mut a = worker(Mode::Normal);
    a.reset_sentence("すもも");
    a.tokenize();
    let mut b = worker(Mode::Normal);
    b.reset_sentence("すもも");
    b.tokenize();
    assert!(a.token(0) == b.token(0));

    let mut c = worker(Mode::Normal);
    c.reset_sentence("もも");
    c.tokenize();
    assert!(a.token(0) != c.token(0));
}

#[test]
fn test_inflection_features() {
    let mut worker = worker(Mode::Normal);
    worker.reset_sentence("買った");
    worker.tokenize();

    assert_eq!(surfaces(&worker), vec!["買っ", "た"]);
    let t = worker.token(0);
    assert_eq!(t.inflectional_type(), "五段・ワ行促音便");
    assert_eq!(t.inflectional_form(), "連用タ接続");
    assert_eq!(t.base_form(), "買う");
    assert_eq!(t.reading(), "カッ");

    let t = worker.token(1);
    assert_eq!(t.pos()[0], "助動詞");
    assert_eq!(t.base_form(), "た");
}

#[test]
fn test_user_dictionary_entry_wins() {
    let user_csv = "朝青龍,朝青龍,アサショウリュウ,カスタム人名\n";
    let user = Arc::new(crate::UserDict::from_reader(user_csv.as_bytes()).unwrap());
    let tokenizer = Tokenizer::new(Arc::new(ipa_mini_dict())).user_dictionary(user);
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("朝青龍");
    worker.tokenize();

    assert_eq!(worker.num_tokens(), 1);
    let t = worker.token(0);
    assert_eq!(t.surface(), "朝青龍");
    assert_eq!(t.class(), NodeClass::User);
    assert_eq!(t.pos(), vec!["カスタム人名"]);
    assert_eq!(
        t.features(),
        vec!["カスタム人名", "朝青龍", "アサショウリュウ"]
    );
}

#[test]
fn test_dat_search_reports_all_prefixes() {
    let dict = ipa_mini_dict();
    let hits = dict.dat_search("もものうち".as_bytes());
    let mo = entry_id(&dict, "も");
    let momo = entry_id(&dict, "もも");
    assert_eq!(hits, vec![(vec![mo], 3), (vec![momo], 6)]);
}

#[test]
fn test_fallback_hello_is_single_proper_noun() {
    let tokenizer = Tokenizer::new(Arc::new(Dict::fallback()));
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("Hello");
    worker.tokenize();

    assert_eq!(worker.num_tokens(), 1);
    let t = worker.token(0);
    assert_eq!(t.surface(), "Hello");
    assert_eq!(t.class(), NodeClass::Unknown);
    assert_eq!(&t.pos()[..2], &["名詞".to_string(), "固有名詞".to_string()]);
}

#[test]
fn test_fallback_pure_ascii_runs() {
    let tokenizer = Tokenizer::new(Arc::new(Dict::fallback()));
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("Hello world");
    worker.tokenize();

    assert_eq!(surfaces(&worker), vec!["Hello", " ", "world"]);
    for t in worker.token_iter() {
        assert_eq!(t.class(), NodeClass::Unknown);
    }
}

#[test]
fn test_unknown_run_truncated_at_limit() {
    let tokenizer = Tokenizer::new(Arc::new(Dict::fallback()));

    // Exactly at the cap: a single grouped token.
    let at_limit = "a".repeat(1024);
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence(&at_limit);
    worker.tokenize();
    assert_eq!(worker.num_tokens(), 1);
    assert_eq!(worker.token(0).char_end(), 1024);

    // One over: truncated runs force a split, and no token exceeds the cap.
    let over_limit = "a".repeat(1025);
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence(&over_limit);
    worker.tokenize();
    assert_eq!(worker.num_tokens(), 2);
    let mut total = 0;
    for t in worker.token_iter() {
        let chars = t.char_end() - t.char_start();
        assert!(chars <= 1024);
        total += chars;
    }
    assert_eq!(total, 1025);
}

#[test]
fn test_loaded_partial_bundle_tokenizes() {
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;

    // A bundle carrying only descriptive metadata: everything else
    // degrades to fallback data and the engine still segments.
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = FileOptions::default();
        writer.start_file("dict.info", options).unwrap();
        let mut data = Vec::new();
        crate::dictionary::reader::writing::put_varint_string(&mut data, "Partial");
        crate::dictionary::reader::writing::put_varint_string(&mut data, "test");
        writer.write_all(&data).unwrap();
        writer.finish().unwrap();
    }
    let (dict, report) = Dict::from_zip(Cursor::new(cursor.into_inner())).unwrap();
    assert_eq!(dict.info().name, "Partial");
    assert_eq!(report.fallback_count(), 8);

    let tokenizer = Tokenizer::new(Arc::new(dict));
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("abc");
    worker.tokenize();
    assert_eq!(worker.num_tokens(), 1);
    assert_eq!(worker.token(0).surface(), "abc");
}
