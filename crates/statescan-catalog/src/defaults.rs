//! The shipped catalogue: the annotation and type names the scanner
//! recognizes out of the box. User configuration adds to these sets, it
//! never replaces them.

pub(crate) const SINGLETON_ANNOTATIONS: &[&str] = &[
    "javax.inject.Singleton",
    "jakarta.inject.Singleton",
    "com.google.inject.Singleton",
    "org.springframework.stereotype.Component",
    "org.springframework.stereotype.Service",
    "org.springframework.stereotype.Repository",
];

pub(crate) const SESSION_ANNOTATIONS: &[&str] = &[
    "javax.enterprise.context.SessionScoped",
    "jakarta.enterprise.context.SessionScoped",
    "org.springframework.web.context.annotation.SessionScope",
];

pub(crate) const REQUEST_ANNOTATIONS: &[&str] = &[
    "javax.enterprise.context.RequestScoped",
    "jakarta.enterprise.context.RequestScoped",
    "org.springframework.web.context.annotation.RequestScope",
];

pub(crate) const ENDPOINT_ANNOTATIONS: &[&str] = &[
    "javax.ws.rs.Path",
    "javax.ws.rs.GET",
    "javax.ws.rs.POST",
    "javax.ws.rs.PUT",
    "javax.ws.rs.DELETE",
    "jakarta.ws.rs.Path",
    "jakarta.ws.rs.GET",
    "jakarta.ws.rs.POST",
    "jakarta.ws.rs.PUT",
    "jakarta.ws.rs.DELETE",
    "org.springframework.web.bind.annotation.RestController",
    "org.springframework.web.bind.annotation.RequestMapping",
    "org.springframework.web.bind.annotation.GetMapping",
    "org.springframework.web.bind.annotation.PostMapping",
    "org.springframework.web.bind.annotation.PutMapping",
    "org.springframework.web.bind.annotation.DeleteMapping",
    "io.micronaut.http.annotation.Controller",
];

pub(crate) const EXTERNAL_STATE_TYPES: &[&str] = &[
    "javax.sql.DataSource",
    "javax.persistence.EntityManager",
    "jakarta.persistence.EntityManager",
    "org.hibernate.SessionFactory",
    "com.zaxxer.hikari.",
    "org.apache.commons.dbcp2.",
    "redis.clients.jedis.",
    "io.lettuce.core.",
    "org.redisson.",
    "com.datastax.",
    "com.mongodb.",
    "javax.jms.",
    "jakarta.jms.",
    "org.apache.kafka.clients.",
    "contains:DataSource",
    "contains:ConnectionPool",
];

pub(crate) const SERVICE_CLIENT_TYPES: &[&str] = &[
    "java.net.http.HttpClient",
    "okhttp3.OkHttpClient",
    "org.apache.http.impl.client.",
    "org.apache.http.client.HttpClient",
    "retrofit2.Retrofit",
    "org.springframework.web.client.RestTemplate",
    "org.springframework.web.reactive.function.client.WebClient",
    "javax.ws.rs.client.Client",
    "jakarta.ws.rs.client.Client",
    "software.amazon.awssdk.",
    "com.amazonaws.",
];

pub(crate) const GRPC_TYPES: &[&str] = &[
    "io.grpc.Channel",
    "io.grpc.ManagedChannel",
    "io.grpc.stub.",
];

pub(crate) const RESILIENCE_TYPES: &[&str] = &[
    "io.github.resilience4j.",
    "com.netflix.hystrix.",
    "dev.failsafe.",
    "contains:CircuitBreaker",
    "contains:RateLimiter",
];

pub(crate) const CACHE_TYPES: &[&str] = &[
    "com.google.common.cache.",
    "com.github.benmanes.caffeine.",
    "org.ehcache.",
    "net.sf.ehcache.",
    "javax.cache.",
    "org.springframework.cache.",
    "contains:Cache",
];

pub(crate) const MUTABLE_COLLECTION_TYPES: &[&str] = &[
    "java.util.Map",
    "java.util.List",
    "java.util.Set",
    "java.util.Queue",
    "java.util.Deque",
    "java.util.Collection",
    "java.util.HashMap",
    "java.util.LinkedHashMap",
    "java.util.TreeMap",
    "java.util.Hashtable",
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.Vector",
    "java.util.Stack",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.TreeSet",
    "java.util.ArrayDeque",
    "java.util.PriorityQueue",
    "java.util.concurrent.",
];

pub(crate) const MODULE_TYPES: &[&str] = &[
    "com.google.inject.AbstractModule",
    "com.google.inject.PrivateModule",
    "com.google.inject.Module",
];

pub(crate) const THREAD_LOCAL_TYPES: &[&str] = &[
    "java.lang.ThreadLocal",
    "java.lang.InheritableThreadLocal",
    "io.netty.util.concurrent.FastThreadLocal",
];

pub(crate) const FILE_STATE_TYPES: &[&str] = &[
    "java.io.File",
    "java.io.FileWriter",
    "java.io.FileOutputStream",
    "java.io.FileInputStream",
    "java.io.RandomAccessFile",
    "java.nio.channels.FileChannel",
    "java.nio.file.WatchService",
];

pub(crate) const SAFE_TYPES: &[&str] = &[
    "org.slf4j.",
    "ch.qos.logback.",
    "org.apache.logging.log4j.",
    "org.apache.commons.logging.",
    "java.util.logging.Logger",
    "java.util.regex.Pattern",
    "java.nio.charset.Charset",
    "com.fasterxml.jackson.databind.ObjectMapper",
    "com.google.gson.Gson",
];
