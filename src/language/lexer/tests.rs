use super::*;
use pretty_assertions::assert_eq;

fn shape(source: &str) -> Vec<(TokenKind, String)> {
    tokenize(source)
        .expect("lex")
        .into_iter()
        .map(|token| (token.kind, token.value))
        .collect()
}

fn values(source: &str) -> Vec<String> {
    tokenize(source)
        .expect("lex")
        .into_iter()
        .filter(|token| token.kind != TokenKind::Eof)
        .map(|token| token.value)
        .collect()
}

fn lexed(source: &str) -> Vec<Token> {
    tokenize(source).expect("lex")
}

#[test]
fn ends_with_eof_sentinel() {
    let tokens = lexed("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
    assert_eq!(tokens[0].value, "EndOfFile");
}

#[test]
fn lexes_declarations_and_keywords() {
    assert_eq!(
        shape("let x = 5; const y = x;"),
        vec![
            (TokenKind::Let, "let".to_string()),
            (TokenKind::Identifier, "x".to_string()),
            (TokenKind::Equals, "=".to_string()),
            (TokenKind::Number, "5".to_string()),
            (TokenKind::Semicolon, ";".to_string()),
            (TokenKind::Const, "const".to_string()),
            (TokenKind::Identifier, "y".to_string()),
            (TokenKind::Equals, "=".to_string()),
            (TokenKind::Identifier, "x".to_string()),
            (TokenKind::Semicolon, ";".to_string()),
            (TokenKind::Eof, "EndOfFile".to_string()),
        ]
    );
}

#[test]
fn recognizes_every_keyword() {
    let kinds: Vec<TokenKind> = lexed("let const func if else for")
        .into_iter()
        .map(|token| token.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Let,
            TokenKind::Const,
            TokenKind::Func,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::For,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn identifiers_are_alphabetic_runs() {
    assert_eq!(values("letter lets"), vec!["letter", "lets"]);
    assert_eq!(values("abc1"), vec!["abc", "1"]);
}

#[test]
fn numbers_take_at_most_one_decimal_point() {
    assert_eq!(values("3.14"), vec!["3.14"]);
    assert_eq!(values("1."), vec!["1."]);
    assert_eq!(values("1.2.3"), vec!["1.2", ".", "3"]);
}

#[test]
fn fresh_minus_digit_is_a_negative_literal() {
    assert_eq!(
        shape("let x = -5")[3],
        (TokenKind::Number, "-5".to_string())
    );
    assert_eq!(values("[-1, -2.5]"), vec!["[", "-1", ",", "-2.5", "]"]);
}

#[test]
fn minus_after_a_value_is_subtraction() {
    assert_eq!(values("x -1"), vec!["x", "-", "1"]);
    assert_eq!(values("5 - 3"), vec!["5", "-", "3"]);
    assert_eq!(values("f(2) -1"), vec!["f", "(", "2", ")", "-", "1"]);
    assert_eq!(values("a[0]-1"), vec!["a", "[", "0", "]", "-", "1"]);
}

#[test]
fn bare_leading_minus_becomes_subtraction_from_zero() {
    assert_eq!(values("-x"), vec!["0", "-", "x"]);
    assert_eq!(values("let y = -x"), vec!["let", "y", "=", "0", "-", "x"]);
    assert_eq!(values("f(-(2))"), vec!["f", "(", "0", "-", "(", "2", ")", ")"]);
}

#[test]
fn arrow_is_a_single_token() {
    assert_eq!(
        shape("a -> b")[1],
        (TokenKind::Arrow, "->".to_string())
    );
}

#[test]
fn two_character_operators() {
    let kinds: Vec<TokenKind> = lexed("== != && & ! = < <= > >= |")
        .into_iter()
        .map(|token| token.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::EqualsCompare,
            TokenKind::NotEqualsCompare,
            TokenKind::And,
            TokenKind::Ampersand,
            TokenKind::Exclamation,
            TokenKind::Equals,
            TokenKind::Lesser,
            TokenKind::LesserEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::Bar,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn comments_produce_no_tokens() {
    assert_eq!(values("x // trailing\ny"), vec!["x", "y"]);
    assert_eq!(values("x /* inner * / still */ y"), vec!["x", "y"]);
    assert_eq!(values("x /* never closed"), vec!["x"]);
}

#[test]
fn strings_keep_decoded_and_raw_text() {
    let tokens = lexed(r#""a\nb\tc\q""#);
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "a\nb\tc\\q");
    assert_eq!(tokens[0].raw, r"a\nb\tc\q");
}

#[test]
fn strings_accept_either_quote() {
    let tokens = lexed(r#"'it"s' "it's""#);
    assert_eq!(tokens[0].value, "it\"s");
    assert_eq!(tokens[1].value, "it's");
}

#[test]
fn escaped_delimiter_and_backslash_decode_to_themselves() {
    let tokens = lexed(r#""say \"hi\" \\ done""#);
    assert_eq!(tokens[0].value, r#"say "hi" \ done"#);
}

#[test]
fn compound_multiply_matches_the_expanded_form() {
    assert_eq!(shape("x *= 2"), shape("x = x * 2"));
    assert_eq!(lexed("x *= 2").len(), lexed("x = x * 2").len());
}

#[test]
fn compound_forms_desugar_for_every_operator() {
    assert_eq!(shape("x /= 4"), shape("x = x / 4"));
    assert_eq!(shape("x += 1"), shape("x = x + 1"));
    assert_eq!(shape("x -= 1"), shape("x = x - 1"));
}

#[test]
fn increments_expand_to_plus_one() {
    assert_eq!(shape("x++"), shape("x = x + 1"));
    assert_eq!(shape("x--"), shape("x = x - 1"));
    assert_eq!(shape("count++;"), shape("count = count + 1;"));
}

#[test]
fn compound_forms_replay_member_paths() {
    assert_eq!(shape("a.b[0] *= 3"), shape("a.b[0] = a.b[0] * 3"));
    assert_eq!(shape("o.k++"), shape("o.k = o.k + 1"));
    assert_eq!(shape("xs[i] /= 2"), shape("xs[i] = xs[i] / 2"));
}

#[test]
fn compound_path_stops_at_statement_boundary() {
    assert_eq!(
        shape("let y = 1; y *= 3"),
        shape("let y = 1; y = y * 3")
    );
}

#[test]
fn compound_without_target_falls_through() {
    assert_eq!(values("2 *= 3"), vec!["2", "*", "=", "3"]);
    assert_eq!(values("(x)++"), vec!["(", "x", ")", "+", "+"]);
}

#[test]
fn doubled_minus_without_target_is_two_subtractions() {
    assert_eq!(values("--x"), vec!["-", "0", "-", "x"]);
}

#[test]
fn desugared_tokens_point_at_the_operator() {
    let tokens = lexed("x *= 2");
    let equals = &tokens[1];
    assert_eq!(equals.kind, TokenKind::Equals);
    assert_eq!(equals.span, Span::new(2, 4));
    let replayed = &tokens[2];
    assert_eq!(replayed.value, "x");
    assert_eq!(replayed.span, Span::new(0, 1));
}

#[test]
fn reports_every_unrecognized_character() {
    let errors = tokenize("let a = 1 # 2 @").expect_err("should fail");
    let chars: Vec<char> = errors.iter().map(|err| err.character).collect();
    assert_eq!(chars, vec!['#', '@']);
    assert_eq!(errors[0].span, Span::new(10, 11));
}

#[test]
fn assignable_path_accepts_identifier_chains() {
    let tokens = lexed("let a.b[0].c");
    let body = &tokens[..tokens.len() - 1];
    let path = assignable_path(body).expect("path");
    let text: Vec<&str> = path.iter().map(|token| token.value.as_str()).collect();
    assert_eq!(text, vec!["a", ".", "b", "[", "0", "]", ".", "c"]);
}

#[test]
fn assignable_path_rejects_non_targets() {
    let cases = ["", "5", "f()", "(x)", "[x]", "a[1 2]", ".b", "x +"];
    for source in cases {
        let tokens = lexed(source);
        let body = &tokens[..tokens.len() - 1];
        assert!(assignable_path(body).is_none(), "`{source}` should not be a target");
    }
}
