pub struct Service {
    pub code: &'static str,
    pub name: &'static str,
}

pub struct FaqItem {
    pub code: &'static str,
    pub question: &'static str,
    pub answer: &'static str,
}

pub const SERVICES: &[Service] = &[
    Service { code: "wash", name: "🛁 Мытьё" },
    Service { code: "haircut", name: "✂️ Стрижка" },
    Service { code: "complex", name: "✨ Комплекс (мытьё + стрижка)" },
    Service { code: "claws", name: "💅 Стрижка когтей" },
];

pub const FAQ: &[FaqItem] = &[
    FaqItem {
        code: "price",
        question: "Сколько стоят услуги?",
        answer: "Мытьё — от 1500 ₽\nСтрижка — от 2500 ₽\nКомплекс — от 3500 ₽\nСтрижка когтей — 500 ₽\n\nТочная цена зависит от породы и размера питомца.",
    },
    FaqItem {
        code: "address",
        question: "Где вы находитесь и как работаете?",
        answer: "ул. Лесная, 12\nЕжедневно с 10:00 до 20:00.",
    },
    FaqItem {
        code: "duration",
        question: "Сколько длится процедура?",
        answer: "Мытьё — около часа, стрижка и комплекс — 2–3 часа.",
    },
    FaqItem {
        code: "vaccination",
        question: "Нужны ли прививки?",
        answer: "Да, питомец должен быть привит. Возьмите с собой ветпаспорт.",
    },
];

pub fn find_service(code: &str) -> Option<&'static Service> {
    SERVICES.iter().find(|service| service.code == code)
}

/// Название услуги для карточки; неизвестный код показывается как есть
pub fn service_name(code: &str) -> &str {
    find_service(code).map(|service| service.name).unwrap_or(code)
}

pub fn find_faq(code: &str) -> Option<&'static FaqItem> {
    FAQ.iter().find(|item| item.code == code)
}
