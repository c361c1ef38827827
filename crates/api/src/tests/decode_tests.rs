// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::NaiveTime;
use schulplan_domain::{RawLessonBatch, RawLessonKind};

use crate::tests::helpers::date;
use crate::{
    ClassHourDto, Envelope, ExamDto, GradeDto, HomeworkDto, LessonBatchDto, LetterDto, StudentDto,
    decode_class_hours, decode_exams, decode_grades, decode_homework, decode_lesson_batch, decode_letters,
    decode_students,
};

fn lesson_batch(json: &str) -> RawLessonBatch {
    let dto: LessonBatchDto = serde_json::from_str(json).unwrap();
    decode_lesson_batch(dto)
}

#[test]
fn test_lesson_batch_decodes_class_hours_and_kinds() {
    let batch: RawLessonBatch = lesson_batch(
        r#"{
            "classHours": [
                {"number": 1, "from": "08:00:00", "until": "08:45:00"},
                {"number": "2", "from": "08:50", "until": "09:35"}
            ],
            "lessons": [
                {
                    "id": 9001,
                    "date": "2025-09-11",
                    "classHour": {"number": 1},
                    "type": "substitution",
                    "actualLesson": {
                        "subject": {"name": "Mathematik", "abbreviation": "M"},
                        "room": {"name": "A101"},
                        "teachers": [{"firstname": "Eva", "lastname": "Lehmann", "abbreviation": "LEH"}]
                    },
                    "originalTeacher": {"firstname": "Jonas", "lastname": "Berger", "abbreviation": "BER"}
                },
                {
                    "date": "2025-09-11T00:00:00",
                    "classHour": {"number": 2},
                    "type": "cancelledLesson",
                    "originalLessons": [
                        {"subject": {"name": "Deutsch", "abbreviation": "D"}, "room": {"name": "B204"}}
                    ]
                }
            ]
        }"#,
    );

    let table = batch.periods.unwrap();
    assert_eq!(table.available_periods(), vec![1, 2]);
    assert_eq!(
        table.get(2).unwrap().start,
        NaiveTime::from_hms_opt(8, 50, 0).unwrap()
    );

    assert_eq!(batch.lessons.len(), 2);
    let substitution = &batch.lessons[0];
    assert_eq!(substitution.id.as_deref(), Some("9001"));
    assert_eq!(substitution.period, Some(1));
    match &substitution.kind {
        RawLessonKind::Substitution {
            actual,
            original_teacher,
        } => {
            assert_eq!(actual.subject_name, "Mathematik");
            assert_eq!(actual.room, "A101");
            assert_eq!(original_teacher.as_ref().unwrap().abbreviation, "BER");
        }
        other => panic!("unexpected kind {other:?}"),
    }

    match &batch.lessons[1].kind {
        RawLessonKind::Cancelled { original } => {
            assert_eq!(original.len(), 1);
            assert_eq!(original[0].subject_name, "Deutsch");
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn test_empty_class_hour_table_decodes_as_none() {
    let batch: RawLessonBatch = lesson_batch(r#"{"classHours": [], "lessons": []}"#);
    assert!(batch.periods.is_none());

    let batch: RawLessonBatch = lesson_batch(r#"{"lessons": []}"#);
    assert!(batch.periods.is_none());
}

#[test]
fn test_unknown_lesson_type_decodes_as_regular() {
    let batch: RawLessonBatch = lesson_batch(
        r#"{"lessons": [{
            "date": "2025-09-11",
            "type": "excursion",
            "actualLesson": {"subject": {"name": "Biologie"}}
        }]}"#,
    );
    assert!(matches!(
        &batch.lessons[0].kind,
        RawLessonKind::Regular(details) if details.subject_name == "Biologie"
    ));
}

#[test]
fn test_lesson_times_are_read_from_class_hour() {
    let batch: RawLessonBatch = lesson_batch(
        r#"{"lessons": [{
            "date": "2025-09-11",
            "classHour": {"number": 3, "from": "09:55:00", "until": "10:40:00"},
            "type": "regularLesson"
        }]}"#,
    );
    let lesson = &batch.lessons[0];
    assert_eq!(lesson.start, NaiveTime::from_hms_opt(9, 55, 0));
    assert_eq!(lesson.end, NaiveTime::from_hms_opt(10, 40, 0));
}

#[test]
fn test_homework_accepts_every_envelope() {
    let shapes: [&str; 4] = [
        r#"{"homeworks": [{"subject": "Englisch", "homework": "Vokabeln", "date": "2025-09-12"}]}"#,
        r#"{"data": [{"subject": "Englisch", "homework": "Vokabeln", "date": "2025-09-12"}]}"#,
        r#"{"data": {"homeworks": [{"subject": "Englisch", "homework": "Vokabeln", "date": "2025-09-12"}]}}"#,
        r#"[{"subject": "Englisch", "homework": "Vokabeln", "date": "2025-09-12"}]"#,
    ];

    for shape in shapes {
        let envelope: Envelope<HomeworkDto> = serde_json::from_str(shape).unwrap();
        let items = decode_homework(envelope);
        assert_eq!(items.len(), 1, "shape {shape}");
        assert_eq!(items[0].subject, "Englisch");
        assert_eq!(items[0].content, "Vokabeln");
        assert_eq!(items[0].date, date(2025, 9, 12));
    }
}

#[test]
fn test_homework_without_date_is_skipped() {
    let envelope: Envelope<HomeworkDto> = serde_json::from_str(
        r#"{"homeworks": [
            {"subject": "Englisch", "homework": "Vokabeln"},
            {"subject": "Physik", "homework": "Aufgabe 3", "date": "not a date"},
            {"subject": "Chemie", "homework": "Protokoll", "date": "2025-09-15"}
        ]}"#,
    )
    .unwrap();
    let items = decode_homework(envelope);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].subject, "Chemie");
}

#[test]
fn test_grades_take_subject_id_from_nested_subject() {
    let envelope: Envelope<GradeDto> = serde_json::from_str(
        r#"[
            {"subject": {"id": 12, "name": "Mathematik"}, "value": 2, "date": "2025-09-10"},
            {"subjectId": "7", "value": "1-"},
            {"subjectId": "8"}
        ]"#,
    )
    .unwrap();
    let grades = decode_grades(envelope);

    assert_eq!(grades.len(), 2);
    assert_eq!(grades[0].subject_id, "12");
    assert_eq!(grades[0].subject, "Mathematik");
    assert_eq!(grades[0].value, "2");
    assert_eq!(grades[0].date, Some(date(2025, 9, 10)));
    assert_eq!(grades[1].value, "1-");
    assert_eq!(grades[1].date, None);
}

#[test]
fn test_exam_title_and_type_fallbacks() {
    let envelope: Envelope<ExamDto> = serde_json::from_str(
        r#"{"exams": [
            {"date": "2025-09-15", "subject": {"name": "Physik"}, "type": {"name": "Klassenarbeit", "color": "red"}},
            {"date": "2025-09-16", "subject": {"name": "Chemie"}, "name": "Säuren", "startClassHour": {"number": 3}},
            {"subject": {"name": "Kunst"}}
        ]}"#,
    )
    .unwrap();
    let exams = decode_exams(envelope);

    assert_eq!(exams.len(), 2);
    assert_eq!(exams[0].title, "Klassenarbeit");
    assert_eq!(exams[0].type_color, "red");
    assert_eq!(exams[0].priority(), 1);
    assert_eq!(exams[1].exam_type, "Exam");
    assert_eq!(exams[1].title, "Säuren");
    assert_eq!(exams[1].period, Some(3));
}

#[test]
fn test_letters_require_an_id() {
    let envelope: Envelope<LetterDto> = serde_json::from_str(
        r#"[
            {"id": 5, "title": " Elternabend ", "sentDate": "2025-09-01T10:00:00"},
            {"title": "Ohne Kennung"}
        ]"#,
    )
    .unwrap();
    let letters = decode_letters(envelope);

    assert_eq!(letters.len(), 1);
    assert_eq!(letters[0].id, "5");
    assert_eq!(letters[0].title, "Elternabend");
    assert_eq!(letters[0].date, Some(date(2025, 9, 1)));
}

#[test]
fn test_students_without_id_are_skipped() {
    let dtos: Vec<StudentDto> = serde_json::from_str(
        r#"[
            {"id": 4711, "firstname": "Mia", "lastname": "Schulz", "classId": 7},
            {"firstname": "Ghost", "lastname": "Entry"}
        ]"#,
    )
    .unwrap();
    let students = decode_students(dtos);

    assert_eq!(students.len(), 1);
    assert_eq!(students[0].id.value(), 4711);
    assert_eq!(students[0].name, "Mia Schulz");
    assert_eq!(students[0].class_id, Some(7));
}

#[test]
fn test_class_hours_without_times_are_skipped() {
    let hours: Vec<ClassHourDto> = serde_json::from_str(
        r#"[
            {"number": 1, "from": "08:00", "until": "08:45"},
            {"number": 2},
            {"number": "x", "from": "09:40", "until": "10:25"}
        ]"#,
    )
    .unwrap();

    assert_eq!(decode_class_hours(&hours).available_periods(), vec![1]);

    let batch: RawLessonBatch = lesson_batch(r#"{"classHours": [{"number": 2}], "lessons": []}"#);
    assert!(batch.periods.is_none());
}
